use crate::{
    ledger::AssertionRecord,
    report::{CollectionOutcome, Reporter, RunOutcome, TestResultInfo},
    unit::TestUnit,
};
use std::io;

/// Reporter emitting the progress through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogReporter {
    _p: (),
}

impl LogReporter {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { _p: () }
    }
}

impl Reporter for LogReporter {
    fn collection_starting(&mut self, num_units: usize) -> io::Result<()> {
        let suffix = match num_units {
            1 => "",
            _ => "s",
        };
        log::info!("running {} unit{}", num_units, suffix);
        Ok(())
    }

    fn collection_ended(&mut self, outcome: &CollectionOutcome) -> io::Result<()> {
        match outcome.first_failure {
            None => log::info!(
                "test status: ok ({:.5}s)",
                outcome.total_duration.as_secs_f64()
            ),
            Some(ref failure) => log::error!(
                "test status: FAILED ({}: {}, {})",
                failure.unit,
                failure.info.display_name,
                failure.record.name
            ),
        }
        Ok(())
    }

    fn unit_starting(&mut self, unit: &dyn TestUnit) -> io::Result<()> {
        log::info!("start: {} ({} sub-tests)", unit.name(), unit.number_of_tests());
        Ok(())
    }

    fn unit_ended(&mut self, outcome: &RunOutcome) -> io::Result<()> {
        if outcome.is_passed() {
            log::info!("{}: ok", outcome.group_name);
        } else {
            log::error!("{}: FAILED", outcome.group_name);
        }
        Ok(())
    }

    fn operation_starting(&mut self, display_name: &str) -> io::Result<()> {
        log::debug!("running {}", display_name);
        Ok(())
    }

    fn operation_ended(
        &mut self,
        info: &TestResultInfo,
        records: &[AssertionRecord],
    ) -> io::Result<()> {
        if info.is_lifecycle() {
            log::debug!("{}: done", info.display_name);
            return Ok(());
        }
        match records.iter().find(|record| !record.status) {
            Some(record) => log::error!(
                "{}: FAILED at {} (expected {:?}, got {:?})",
                info.display_name,
                record.name,
                record.expected,
                record.result
            ),
            None if records.is_empty() => log::warn!("{}: no assertions", info.display_name),
            None => log::info!("{}: ok", info.display_name),
        }
        Ok(())
    }
}
