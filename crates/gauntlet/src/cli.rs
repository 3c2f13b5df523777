//! Entry point of test binaries.

mod args;
mod exit_status;

pub use self::{
    args::{Args, ColorConfig},
    exit_status::ExitStatus,
};

use crate::collection::Collection;

/// Run the collection with the arguments of the current process.
///
/// The returned status is meant to be passed to [`ExitStatus::exit`] once the
/// caller has released its own resources.
///
/// [`ExitStatus::exit`]: ./struct.ExitStatus.html#method.exit
pub fn test_main(collection: &mut Collection) -> ExitStatus {
    crate::runner::install_panic_hook();

    let args = match Args::from_env() {
        Ok(args) => args,
        Err(status) => return status,
    };

    match collection.run_in_console(&args) {
        Ok(passed) => ExitStatus::from_passed(passed),
        Err(err) => {
            log::error!("the run was aborted: {}", err);
            eprintln!("\nerror: {}", err);
            ExitStatus::FAILED
        }
    }
}
