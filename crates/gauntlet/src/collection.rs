use crate::{
    cli::Args,
    error::RunError,
    ledger::AssertionRecord,
    report::{CollectionOutcome, Failure, Reporter, RunOutcome, TestResultInfo},
    reporter::ConsoleReporter,
    runner::{self, Callbacks},
    unit::TestUnit,
};
use indexmap::IndexMap;
use std::io::{self, Write};

/// An ordered set of test units, keyed by unit name.
#[derive(Default)]
pub struct Collection {
    units: IndexMap<String, Box<dyn TestUnit>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit to the collection.
    ///
    /// A unit registered under a name already in use replaces the previous
    /// one at its original position, and the previous one is returned.
    pub fn register<U>(&mut self, unit: U) -> Option<Box<dyn TestUnit>>
    where
        U: TestUnit + 'static,
    {
        self.register_boxed(Box::new(unit))
    }

    pub fn register_boxed(&mut self, unit: Box<dyn TestUnit>) -> Option<Box<dyn TestUnit>> {
        let name = unit.name().to_owned();
        log::trace!("register: {}", name);
        self.units.insert(name, unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over the registered units in registration order.
    pub fn units(&self) -> impl Iterator<Item = &dyn TestUnit> + '_ {
        self.units.values().map(|unit| &**unit)
    }

    pub fn get(&self, name: &str) -> Option<&dyn TestUnit> {
        self.units.get(name).map(|unit| &**unit)
    }

    /// Run every unit, in registration order.
    pub fn run(&mut self, reporter: &mut dyn Reporter) -> Result<CollectionOutcome, RunError> {
        self.run_matching(reporter, |_| true)
    }

    /// Run the units whose names are accepted by `selected`.
    ///
    /// The iteration stops after the first failing unit whose halt policy
    /// is on.
    pub fn run_matching<F>(
        &mut self,
        reporter: &mut dyn Reporter,
        mut selected: F,
    ) -> Result<CollectionOutcome, RunError>
    where
        F: FnMut(&str) -> bool,
    {
        let mut outcome = CollectionOutcome::default();
        let num_units = self.units.keys().filter(|name| selected(name.as_str())).count();
        outcome.filtered_out = self.units.len() - num_units;

        reporter.collection_starting(num_units)?;

        for (name, unit) in &mut self.units {
            if !selected(name.as_str()) {
                log::trace!("filtered out: {}", name);
                continue;
            }
            let unit = &mut **unit;

            reporter.unit_starting(unit)?;
            let mut driver = Driver {
                reporter: &mut *reporter,
                unit_name: name.as_str(),
                must_pass: unit.must_pass(),
                outcome: RunOutcome::new(unit),
                first_failure: &mut outcome.first_failure,
            };
            runner::run_with(unit, &mut driver)?;
            let run_outcome = driver.outcome;
            reporter.unit_ended(&run_outcome)?;

            let passed = run_outcome.is_passed();
            if passed {
                outcome.total_duration += run_outcome.group_duration;
            }
            outcome.outcomes.push(run_outcome);

            if !passed && unit.must_pass() {
                log::debug!("{} failed, skipping the remaining units", name);
                break;
            }
        }

        reporter.collection_ended(&outcome)?;
        Ok(outcome)
    }

    /// Run the collection as configured by the command line, rendering
    /// the progress to the standard output.
    ///
    /// Returns whether every unit passed.
    pub fn run_in_console(&mut self, args: &Args) -> Result<bool, RunError> {
        if args.list {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            self.print_list(&mut stdout, |name| !args.is_filtered_out(name))?;
            return Ok(true);
        }

        let mut reporter = ConsoleReporter::stdout(args.color_choice(), args.console_config());
        let outcome = self.run_matching(&mut reporter, |name| !args.is_filtered_out(name))?;
        Ok(outcome.is_passed())
    }

    /// Print the selected units along with their discovered operations.
    pub fn print_list<F>(&self, out: &mut dyn Write, mut selected: F) -> io::Result<()>
    where
        F: FnMut(&str) -> bool,
    {
        let mut num_units = 0;
        let mut num_tests = 0;
        for unit in self.units().filter(|unit| selected(unit.name())) {
            writeln!(out, "{}: unit", unit.name())?;
            for operation in unit.operations() {
                writeln!(out, "    {}: test", operation.display_name())?;
            }
            num_units += 1;
            num_tests += unit.number_of_tests();
        }
        writeln!(out)?;
        writeln!(out, "{} units, {} tests", num_units, num_tests)?;
        Ok(())
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.units.keys()).finish()
    }
}

/// Forwards the progress of a unit to the reporter while tallying its outcome.
struct Driver<'a> {
    reporter: &'a mut dyn Reporter,
    unit_name: &'a str,
    must_pass: bool,
    outcome: RunOutcome,
    first_failure: &'a mut Option<Failure>,
}

impl Callbacks for Driver<'_> {
    fn on_start(&mut self, display_name: &str) -> io::Result<()> {
        self.reporter.operation_starting(display_name)
    }

    fn on_result(&mut self, info: &TestResultInfo, records: &[AssertionRecord]) -> io::Result<()> {
        self.reporter.operation_ended(info, records)?;

        let failed = self.outcome.record(info, records, self.must_pass);
        match failed {
            Some(record) if self.first_failure.is_none() => {
                *self.first_failure = Some(Failure {
                    unit: self.unit_name.to_owned(),
                    info: info.clone(),
                    record: record.clone(),
                });
            }
            _ => (),
        }
        Ok(())
    }
}
