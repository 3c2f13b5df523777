use proc_macro2::TokenStream;
use quote::{quote, ToTokens, TokenStreamExt as _};
use syn::{
    ext::IdentExt as _,
    parse::{Error, Parse, ParseStream, Result},
    Attribute, FnArg, Ident, ImplItem, ImplItemMethod, ItemImpl, LitBool, LitStr, Path, Signature,
    Token, Visibility,
};

macro_rules! try_quote {
    ($e:expr) => {
        match $e {
            Ok(parsed) => parsed,
            Err(err) => return err.to_compile_error(),
        }
    };
}

const TEST_PREFIX: &str = "test";

pub(crate) fn test_unit(args: TokenStream, item: TokenStream) -> TokenStream {
    let params = try_quote!(syn::parse2::<Params>(args));
    let mut item = try_quote!(syn::parse2::<ItemImpl>(item));

    if let Some((_, ref path, _)) = item.trait_ {
        return Error::new_spanned(path, "#[test_unit] must be placed on an inherent impl block")
            .to_compile_error();
    }

    match &item.generics {
        generics if generics.params.is_empty() => (),
        generics => {
            return Error::new_spanned(generics, "test units cannot take generic parameters")
                .to_compile_error()
        }
    }

    let methods = try_quote!(collect_methods(&mut item));

    Generated {
        params: &params,
        item: &item,
        methods: &methods,
    }
    .to_token_stream()
}

struct Params {
    name: Option<LitStr>,
    must_pass: Option<LitBool>,
    crate_path: Path,
}

impl Parse for Params {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut name = None;
        let mut must_pass = None;
        let mut crate_path = None;

        while !input.is_empty() {
            match input.call(Ident::parse_any)? {
                id if id == "name" => {
                    let _: Token![=] = input.parse()?;
                    name.replace(input.parse()?);
                }
                id if id == "must_pass" => {
                    let _: Token![=] = input.parse()?;
                    must_pass.replace(input.parse()?);
                }
                id if id == "crate" => {
                    let _: Token![=] = input.parse()?;
                    crate_path.replace(input.call(Path::parse_mod_style)?);
                }
                id => return Err(Error::new_spanned(id, "unknown parameter name")),
            }

            if input.is_empty() {
                break;
            }
            let _: Token![,] = input.parse()?;
        }

        Ok(Self {
            name,
            must_pass,
            crate_path: crate_path.unwrap_or_else(|| syn::parse_quote!(::gauntlet)),
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Kind {
    Init,
    Shutdown,
    Method,
    Tagged,
}

struct Method {
    ident: Ident,
    kind: Kind,
    takes_context: bool,
}

fn collect_methods(item: &mut ItemImpl) -> Result<Vec<Method>> {
    let mut methods = vec![];
    let mut errors = Errors::default();

    for impl_item in &mut item.items {
        let method = match impl_item {
            ImplItem::Method(method) => method,
            _ => continue,
        };
        errors.append_if_error(classify(method).map(|m| methods.extend(m)));
    }
    errors.into_result()?;

    Ok(methods)
}

fn classify(method: &mut ImplItemMethod) -> Result<Option<Method>> {
    let tag = take_test_marker(&mut method.attrs);
    let ident = &method.sig.ident;
    let public = match method.vis {
        Visibility::Public(..) => true,
        _ => false,
    };

    let kind = match (ident.to_string().as_str(), tag) {
        ("init", None) => Kind::Init,
        ("shutdown", None) => Kind::Shutdown,
        ("init", Some(tag)) | ("shutdown", Some(tag)) => {
            return Err(Error::new_spanned(
                tag,
                "lifecycle hooks cannot be marked as test operations",
            ))
        }
        (_, Some(tag)) if !public => {
            return Err(Error::new_spanned(tag, "test operations must be public"));
        }
        (_, Some(..)) => Kind::Tagged,
        (name, None) if public && name.starts_with(TEST_PREFIX) => Kind::Method,
        _ => return Ok(None),
    };

    let takes_context = check_signature(&method.sig)?;

    Ok(Some(Method {
        ident: ident.clone(),
        kind,
        takes_context,
    }))
}

/// Remove the `#[test]` markers, returning the first one.
fn take_test_marker(attrs: &mut Vec<Attribute>) -> Option<Attribute> {
    let mut marker = None;
    attrs.retain(|attr| {
        if !attr.path.is_ident("test") {
            return true;
        }
        if marker.is_none() {
            marker = Some(attr.clone());
        }
        false
    });
    marker
}

/// Check the shape of a test method and return whether it takes a context.
fn check_signature(sig: &Signature) -> Result<bool> {
    if let Some(ref asyncness) = sig.asyncness {
        return Err(Error::new_spanned(
            asyncness,
            "test operations cannot be async",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "test operations cannot take generic parameters",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => (),
        _ => {
            return Err(Error::new_spanned(
                sig,
                "test operations must take `&self` or `&mut self` as the receiver",
            ))
        }
    }

    match (inputs.next(), inputs.next()) {
        (None, None) => Ok(false),
        (Some(FnArg::Typed(..)), None) => Ok(true),
        (_, extra) => Err(Error::new_spanned(
            extra.map_or_else(|| sig.inputs.to_token_stream(), |arg| arg.to_token_stream()),
            "test operations take at most one argument, the test context",
        )),
    }
}

#[derive(Default)]
struct Errors(Option<Error>);

impl Errors {
    fn append_if_error(&mut self, res: Result<()>) {
        match (self.0.as_mut(), res) {
            (Some(errors), Err(error)) => errors.combine(error),
            (None, Err(error)) => self.0 = Some(error),
            (_, Ok(())) => (),
        }
    }

    fn into_result(self) -> Result<()> {
        match self.0 {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }
}

struct Generated<'a> {
    params: &'a Params,
    item: &'a ItemImpl,
    methods: &'a [Method],
}

impl ToTokens for Generated<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let crate_path = &self.params.crate_path;
        let item = &*self.item;
        let self_ty = &*self.item.self_ty;

        let name = self.params.name.as_ref().map(|name| quote!(.name(#name)));
        let must_pass = self
            .params
            .must_pass
            .as_ref()
            .map(|must_pass| quote!(.must_pass(#must_pass)));

        let declarations = self.methods.iter().map(|method| {
            let ident = &method.ident;
            let call = if method.takes_context {
                quote!(Self::#ident(__state, __ctx))
            } else {
                quote!(Self::#ident(__state))
            };
            let testfn = quote! {
                |__state, __ctx| {
                    let _ = &__ctx;
                    __gauntlet::Termination::into_result(#call)
                }
            };
            let literal = LitStr::new(&ident.to_string(), ident.span());
            match method.kind {
                Kind::Init => quote!(.init(#testfn)),
                Kind::Shutdown => quote!(.shutdown(#testfn)),
                Kind::Method => quote!(.method(#literal, #testfn)),
                Kind::Tagged => quote!(.tagged(#literal, #testfn)),
            }
        });

        tokens.append_all(Some(quote! {
            #item

            impl #crate_path::_reexports::Describe for #self_ty {
                fn describe(
                    unit: #crate_path::_reexports::UnitBuilder<Self>,
                ) -> #crate_path::_reexports::UnitBuilder<Self> {
                    #[allow(unused_imports)]
                    use #crate_path::_reexports as __gauntlet;

                    unit #name #must_pass #(#declarations)*
                }
            }
        }));
    }
}
