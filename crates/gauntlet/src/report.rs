use crate::{
    ledger::AssertionRecord,
    unit::{Hook, Operation, TestUnit},
};
use indexmap::IndexMap;
use std::{io, time::Duration};

/// Envelope describing one executed operation or lifecycle hook.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResultInfo {
    pub name: String,
    pub display_name: String,
    pub duration: Duration,
    /// The hook this envelope was produced for, if any.
    pub hook: Option<Hook>,
}

impl TestResultInfo {
    pub(crate) fn for_operation(operation: &Operation, duration: Duration) -> Self {
        Self {
            name: operation.name().to_owned(),
            display_name: operation.display_name().to_owned(),
            duration,
            hook: None,
        }
    }

    pub(crate) fn for_hook(hook: Hook, duration: Duration) -> Self {
        Self {
            name: hook.name().to_owned(),
            display_name: hook.display_name().to_owned(),
            duration,
            hook: Some(hook),
        }
    }

    #[inline]
    pub fn is_lifecycle(&self) -> bool {
        self.hook.is_some()
    }
}

/// A failing assertion along with the unit and operation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub unit: String,
    pub info: TestResultInfo,
    pub record: AssertionRecord,
}

/// Aggregated results of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub group_name: String,
    pub sub_test_count: usize,
    pub group_duration: Duration,
    pub failures: IndexMap<String, Vec<AssertionRecord>>,
}

impl RunOutcome {
    pub fn new(unit: &dyn TestUnit) -> Self {
        Self {
            group_name: unit.name().to_owned(),
            sub_test_count: unit.number_of_tests(),
            group_duration: Duration::default(),
            failures: IndexMap::new(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Account for the records produced by one operation.
    ///
    /// Returns the first failing record among them. With `must_pass` set,
    /// records following that failure are not taken into account.
    ///
    /// Durations count toward the unit only for operations that made more
    /// than one assertion.
    pub(crate) fn record<'r>(
        &mut self,
        info: &TestResultInfo,
        records: &'r [AssertionRecord],
        must_pass: bool,
    ) -> Option<&'r AssertionRecord> {
        let breakdown = records.len() > 1;
        let mut first_failure = None;
        for record in records {
            if breakdown {
                self.group_duration += record.duration;
            }
            if record.status {
                continue;
            }

            self.failures
                .entry(info.name.clone())
                .or_insert_with(Vec::new)
                .push(record.clone());
            if first_failure.is_none() {
                first_failure = Some(record);
            }
            if must_pass {
                break;
            }
        }
        first_failure
    }
}

/// Aggregated results of a whole collection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionOutcome {
    /// Sum of the durations of every unit that passed.
    pub total_duration: Duration,
    /// The first failing assertion of the run.
    pub first_failure: Option<Failure>,
    pub outcomes: Vec<RunOutcome>,
    /// Number of units excluded from the run by filtering.
    pub filtered_out: usize,
}

impl CollectionOutcome {
    pub fn is_passed(&self) -> bool {
        self.first_failure.is_none()
    }
}

/// Receiver of the events of a collection run.
pub trait Reporter {
    fn collection_starting(&mut self, num_units: usize) -> io::Result<()>;
    fn collection_ended(&mut self, outcome: &CollectionOutcome) -> io::Result<()>;

    fn unit_starting(&mut self, unit: &dyn TestUnit) -> io::Result<()>;
    fn unit_ended(&mut self, outcome: &RunOutcome) -> io::Result<()>;

    fn operation_starting(&mut self, display_name: &str) -> io::Result<()>;
    fn operation_ended(
        &mut self,
        info: &TestResultInfo,
        records: &[AssertionRecord],
    ) -> io::Result<()>;
}

macro_rules! impl_reporter_body {
    () => {
        fn collection_starting(&mut self, num_units: usize) -> io::Result<()> {
            (**self).collection_starting(num_units)
        }

        fn collection_ended(&mut self, outcome: &CollectionOutcome) -> io::Result<()> {
            (**self).collection_ended(outcome)
        }

        fn unit_starting(&mut self, unit: &dyn TestUnit) -> io::Result<()> {
            (**self).unit_starting(unit)
        }

        fn unit_ended(&mut self, outcome: &RunOutcome) -> io::Result<()> {
            (**self).unit_ended(outcome)
        }

        fn operation_starting(&mut self, display_name: &str) -> io::Result<()> {
            (**self).operation_starting(display_name)
        }

        fn operation_ended(
            &mut self,
            info: &TestResultInfo,
            records: &[AssertionRecord],
        ) -> io::Result<()> {
            (**self).operation_ended(info, records)
        }
    };
}

impl<R: ?Sized> Reporter for &mut R
where
    R: Reporter,
{
    impl_reporter_body!();
}

impl<R: ?Sized> Reporter for Box<R>
where
    R: Reporter,
{
    impl_reporter_body!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    fn records(statuses: &[bool]) -> Vec<AssertionRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| AssertionRecord {
                status,
                name: format!("Assertion {}", i + 1),
                result: status.into(),
                expected: true.into(),
                duration: Duration::from_millis(10),
            })
            .collect()
    }

    fn info(name: &str) -> TestResultInfo {
        TestResultInfo {
            name: name.to_owned(),
            display_name: name.to_owned(),
            duration: Duration::from_millis(30),
            hook: None,
        }
    }

    fn outcome() -> RunOutcome {
        let unit = Unit::<()>::builder("Unit").build(());
        RunOutcome::new(&unit)
    }

    #[test]
    fn stops_at_first_failure_with_must_pass() {
        let mut outcome = outcome();
        let records = records(&[true, false, false]);
        let failure = outcome.record(&info("test_a"), &records, true);

        assert_eq!(failure.map(|r| &r.name[..]), Some("Assertion 2"));
        assert_eq!(outcome.failures["test_a"].len(), 1);
        assert_eq!(outcome.group_duration, Duration::from_millis(20));
        assert!(!outcome.is_passed());
    }

    #[test]
    fn collects_every_failure_without_must_pass() {
        let mut outcome = outcome();
        let records = records(&[false, true, false]);
        let failure = outcome.record(&info("test_a"), &records, false);

        assert_eq!(failure.map(|r| &r.name[..]), Some("Assertion 1"));
        assert_eq!(outcome.failures["test_a"].len(), 2);
        assert_eq!(outcome.group_duration, Duration::from_millis(30));
    }

    #[test]
    fn passing_records() {
        let mut outcome = outcome();
        assert!(outcome.record(&info("test_a"), &records(&[true]), true).is_none());
        assert!(outcome.record(&info("test_b"), &[], true).is_none());
        assert!(outcome.is_passed());
        assert_eq!(outcome.group_duration, Duration::default());
    }

    #[test]
    fn single_assertions_do_not_count_toward_the_unit() {
        let mut outcome = outcome();
        let mut slow = records(&[true]);
        slow[0].duration = Duration::from_millis(50);
        outcome.record(&info("test_slow"), &slow, true);
        assert_eq!(outcome.group_duration, Duration::default());

        let failed = records(&[false]);
        let failure = outcome.record(&info("test_fails"), &failed, true);
        assert_eq!(failure.map(|r| &r.name[..]), Some("Assertion 1"));
        assert_eq!(outcome.failures["test_fails"].len(), 1);
        assert_eq!(outcome.group_duration, Duration::default());

        outcome.record(&info("test_many"), &records(&[true, true]), true);
        assert_eq!(outcome.group_duration, Duration::from_millis(20));
    }

    #[test]
    fn lifecycle_envelopes() {
        let info = TestResultInfo::for_hook(Hook::Init, Duration::default());
        assert!(info.is_lifecycle());
        assert_eq!(info.name, "init");
        assert_eq!(info.display_name, "Initializer");
    }
}
