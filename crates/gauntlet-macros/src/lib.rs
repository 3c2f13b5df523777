extern crate proc_macro;

mod test_unit;

use proc_macro::TokenStream;

/// Declare a test unit from an inherent `impl` block.
#[proc_macro_attribute]
pub fn test_unit(args: TokenStream, item: TokenStream) -> TokenStream {
    crate::test_unit::test_unit(args.into(), item.into()).into()
}
