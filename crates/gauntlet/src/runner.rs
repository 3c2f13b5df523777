use crate::{
    error::{Cause, OperationFailure, RunError},
    ledger::AssertionRecord,
    report::TestResultInfo,
    unit::{Hook, TestUnit},
};
use maybe_unwind::maybe_unwind;
use std::{io, panic::AssertUnwindSafe, sync::Once, time::Instant};

/// Receiver of the progress of a single unit.
pub trait Callbacks {
    /// Called right before an operation or hook starts.
    fn on_start(&mut self, display_name: &str) -> io::Result<()>;

    /// Called once an operation or hook has completed, with the assertions
    /// it recorded.
    fn on_result(&mut self, info: &TestResultInfo, records: &[AssertionRecord]) -> io::Result<()>;
}

impl<F, G> Callbacks for (F, G)
where
    F: FnMut(&str) -> io::Result<()>,
    G: FnMut(&TestResultInfo, &[AssertionRecord]) -> io::Result<()>,
{
    fn on_start(&mut self, display_name: &str) -> io::Result<()> {
        (self.0)(display_name)
    }

    fn on_result(&mut self, info: &TestResultInfo, records: &[AssertionRecord]) -> io::Result<()> {
        (self.1)(info, records)
    }
}

/// Install the panic hook that lets panics inside operations be captured
/// instead of printed. Only the first call has an effect.
pub(crate) fn install_panic_hook() {
    static SET_HOOK: Once = Once::new();
    SET_HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            if !maybe_unwind::capture_panic_info(info) {
                eprintln!("{}", info);
            }
        }));
    });
}

/// Run the unit, reporting progress through a pair of closures.
pub fn run<F, G>(unit: &mut dyn TestUnit, on_start: F, on_result: G) -> Result<(), RunError>
where
    F: FnMut(&str) -> io::Result<()>,
    G: FnMut(&TestResultInfo, &[AssertionRecord]) -> io::Result<()>,
{
    run_with(unit, &mut (on_start, on_result))
}

/// Run the unit.
///
/// The `init` hook runs first, then the operations in discovery order until
/// one of them records a failing assertion. The `shutdown` hook is always
/// attempted last, even when an earlier step did not complete, in which case
/// the earlier error is the one returned.
pub fn run_with(unit: &mut dyn TestUnit, callbacks: &mut dyn Callbacks) -> Result<(), RunError> {
    log::debug!("{}: running {} operation(s)", unit.name(), unit.number_of_tests());

    let result = run_operations(unit, callbacks);

    let shutdown = match result {
        Err(RunError::Io(..)) => run_hook(unit, Hook::Shutdown, None),
        _ => run_hook(unit, Hook::Shutdown, Some(callbacks)),
    };

    match (result, shutdown) {
        (Ok(()), shutdown) => shutdown,
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(shutdown_err)) => {
            log::error!(
                "{}: shutdown failed after an earlier error: {}",
                unit.name(),
                shutdown_err
            );
            Err(err)
        }
    }
}

fn run_operations(unit: &mut dyn TestUnit, callbacks: &mut dyn Callbacks) -> Result<(), RunError> {
    run_hook(unit, Hook::Init, Some(&mut *callbacks))?;

    for index in 0..unit.number_of_tests() {
        let operation = unit.operations()[index].clone();

        callbacks.on_start(operation.display_name())?;
        let start = Instant::now();
        guarded(unit.name().to_owned(), operation.name(), || {
            unit.call_operation(index)
        })?;
        let info = TestResultInfo::for_operation(&operation, start.elapsed());

        let records = unit.ledger().records(operation.name());
        callbacks.on_result(&info, records)?;

        if records.iter().any(|record| !record.status) {
            log::debug!(
                "{}: {} failed, skipping the remaining operations",
                unit.name(),
                operation.name()
            );
            break;
        }
    }

    Ok(())
}

fn run_hook(
    unit: &mut dyn TestUnit,
    hook: Hook,
    callbacks: Option<&mut dyn Callbacks>,
) -> Result<(), RunError> {
    if !unit.has_hook(hook) {
        return Ok(());
    }
    log::trace!("{}: {}", unit.name(), hook);

    match callbacks {
        Some(callbacks) => {
            callbacks.on_start(hook.display_name())?;
            let start = Instant::now();
            guarded(unit.name().to_owned(), hook.name(), || unit.call_hook(hook))?;
            let info = TestResultInfo::for_hook(hook, start.elapsed());
            callbacks.on_result(&info, &[])?;
        }
        None => {
            guarded(unit.name().to_owned(), hook.name(), || unit.call_hook(hook))?;
        }
    }
    Ok(())
}

fn guarded<F>(unit: String, operation: &str, f: F) -> Result<(), OperationFailure>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let cause = match maybe_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => Cause::Errored(err),
        Err(unwind) => Cause::Panicked(unwind.to_string()),
    };
    Err(OperationFailure {
        unit,
        operation: operation.to_owned(),
        cause,
    })
}
