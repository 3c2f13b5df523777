use crate::{
    describe::describe_mismatch,
    layout::{center, cursor_down, cursor_up, justify_space_between, rule},
    ledger::AssertionRecord,
    report::{CollectionOutcome, Reporter, RunOutcome, TestResultInfo},
    style::{palette_for, Palette, Role},
    unit::TestUnit,
};
use std::{
    io::{self, Write},
    time::Duration,
};
use termcolor::{ColorChoice, StandardStream};

const TITLE: &[&str] = &[
    "  ###    ##   #    # #    # ###### #      ###### ######",
    "#       #  #  #    # ##   #   #    #      #        #   ",
    "#  ### ###### #    # # #  #   #    #      ####     #   ",
    "#    # #    # #    # #  # #   #    #      #        #   ",
    " ####  #    #  ####  #   ##   #    ###### ######   #   ",
];

const PASSED: &[&str] = &[
    "#####    ##    #####  ##### ###### ##### ",
    "#    #  #  #  #      #      #      #    #",
    "#####  ######  ####   ####  ####   #    #",
    "#      #    #      #      # #      #    #",
    "#      #    # #####  #####  ###### ##### ",
];

const FAILED: &[&str] = &[
    "######   ##   ###### #      ###### ##### ",
    "#       #  #    ##   #      #      #    #",
    "####   ######   ##   #      ####   #    #",
    "#      #    #   ##   #      #      #    #",
    "#      #    # ###### ###### ###### ##### ",
];

const DEFAULT_COLS: usize = 80;

/// Layout settings of the console report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Width of the terminal, in columns.
    pub cols: usize,
    /// Number of decimals shown for durations, in seconds.
    pub precision: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            precision: 5,
        }
    }
}

/// Reporter rendering live progress to a terminal.
///
/// Each operation is announced on its own line, which is replaced by the
/// result as soon as the operation completes. Once a unit is done, its
/// header line is rewritten in place with the summary of the unit.
pub struct ConsoleReporter<W> {
    out: W,
    palette: Box<dyn Palette>,
    config: ConsoleConfig,
    unit_must_pass: bool,
    printed_lines: usize,
}

impl ConsoleReporter<StandardStream> {
    /// Create a reporter writing to the standard output.
    pub fn stdout(choice: ColorChoice, config: ConsoleConfig) -> Self {
        Self::new(StandardStream::stdout(choice), palette_for(choice), config)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, palette: Box<dyn Palette>, config: ConsoleConfig) -> Self {
        let cols = match config.cols {
            0 => DEFAULT_COLS,
            cols => cols,
        };
        Self {
            out,
            palette,
            config: ConsoleConfig { cols, ..config },
            unit_must_pass: true,
            printed_lines: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, role: Role) -> String {
        self.palette.paint(text, role)
    }

    fn seconds(&self, duration: Duration) -> String {
        format!("{:.*}s", self.config.precision, duration.as_secs_f64())
    }

    fn status_line(&mut self, indent: usize, mark: Role, label: &str, duration: Duration) -> io::Result<()> {
        let (symbol, badge, badge_role) = match mark {
            Role::PassMark => ("✓", "  PASSED  ", Role::PassBadge),
            Role::FailMark => ("✖", "  FAILED  ", Role::FailBadge),
            Role::HookMark => ("✓", "          ", Role::HookBadge),
            _ => ("?", "  ??????  ", Role::UnknownBadge),
        };
        let left = format!(
            "{}{} {} - [{}]",
            " ".repeat(indent),
            self.paint(symbol, mark),
            label,
            self.seconds(duration)
        );
        let right = self.paint(badge, badge_role);
        let line = justify_space_between(self.config.cols, &left, &right);
        writeln!(self.out, "{}", line)?;
        self.printed_lines += 1;
        Ok(())
    }

    fn print_banner(&mut self, art: &[&str], role: Role) -> io::Result<()> {
        for line in art {
            let painted = self.paint(line, role);
            writeln!(self.out, "{}", center(self.config.cols, &painted))?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn collection_starting(&mut self, num_units: usize) -> io::Result<()> {
        let cols = self.config.cols;
        writeln!(self.out)?;
        self.print_banner(TITLE, Role::Title)?;
        writeln!(self.out)?;
        let suffix = match num_units {
            1 => "",
            _ => "s",
        };
        let running = format!("Running {} test{}", num_units, suffix);
        writeln!(self.out, "{}", center(cols, &running))?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule(cols))?;
        self.out.flush()
    }

    fn collection_ended(&mut self, outcome: &CollectionOutcome) -> io::Result<()> {
        let cols = self.config.cols;
        writeln!(self.out)?;
        writeln!(self.out, "{}", rule(cols))?;
        writeln!(self.out)?;

        match outcome.first_failure {
            Some(ref failure) => {
                self.print_banner(FAILED, Role::BannerFail)?;
                writeln!(self.out)?;

                let heading = format!("{}: {}", failure.unit, failure.info.display_name);
                let heading = self.paint(&heading, Role::Emphasis);
                writeln!(self.out, "{}", center(cols, &heading))?;

                let assertion = format!(
                    "Failed the assertion {}",
                    self.paint(&failure.record.name, Role::Emphasis)
                );
                writeln!(self.out, "{}", center(cols, &assertion))?;
                writeln!(
                    self.out,
                    "{}",
                    center(cols, &describe_mismatch(&failure.record))
                )?;

                writeln!(self.out)?;
                writeln!(self.out, "{}", center(cols, &rule(cols * 4 / 5)))?;
                writeln!(self.out)?;
            }
            None => {
                self.print_banner(PASSED, Role::BannerPass)?;
                writeln!(self.out)?;

                let passed = format!(
                    "{} [{}]",
                    self.paint("All tests Passed!", Role::Emphasis),
                    self.seconds(outcome.total_duration)
                );
                writeln!(self.out, "{}", center(cols, &passed))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn unit_starting(&mut self, unit: &dyn TestUnit) -> io::Result<()> {
        self.unit_must_pass = unit.must_pass();
        self.printed_lines = 0;

        writeln!(self.out)?;
        writeln!(
            self.out,
            "- {} - Running {} sub-tests.",
            unit.name(),
            unit.number_of_tests()
        )?;
        self.printed_lines += 1;
        self.out.flush()
    }

    fn unit_ended(&mut self, outcome: &RunOutcome) -> io::Result<()> {
        let (mark, symbol, badge, badge_role) = if outcome.is_passed() {
            (Role::PassMark, "✓", "  PASSED  ", Role::PassBadge)
        } else {
            (Role::FailMark, "✖", "  FAILED  ", Role::FailBadge)
        };
        let left = format!(
            "{} {} - {} sub-tests - [{}]",
            self.paint(symbol, mark),
            outcome.group_name,
            outcome.sub_test_count,
            self.seconds(outcome.group_duration)
        );
        let right = self.paint(badge, badge_role);
        let summary = justify_space_between(self.config.cols, &left, &right);

        if self.palette.rewrites_lines() {
            write!(
                self.out,
                "{}{}{}",
                cursor_up(self.printed_lines),
                summary,
                cursor_down(self.printed_lines)
            )?;
        } else {
            writeln!(self.out, "{}", summary)?;
        }
        self.printed_lines = 0;
        self.out.flush()
    }

    fn operation_starting(&mut self, display_name: &str) -> io::Result<()> {
        if self.palette.rewrites_lines() {
            writeln!(self.out, "  > Running {}...", display_name)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn operation_ended(
        &mut self,
        info: &TestResultInfo,
        records: &[AssertionRecord],
    ) -> io::Result<()> {
        if self.palette.rewrites_lines() {
            write!(self.out, "{}", cursor_up(1))?;
        }

        match records {
            [] if info.is_lifecycle() => {
                self.status_line(2, Role::HookMark, &info.display_name, info.duration)?;
            }
            [] => {
                self.status_line(2, Role::UnknownMark, &info.display_name, info.duration)?;
                let note = self.paint("No test results found!", Role::Emphasis);
                writeln!(self.out, "    {}", note)?;
                self.printed_lines += 1;
            }
            [record] => {
                let mark = if record.status {
                    Role::PassMark
                } else {
                    Role::FailMark
                };
                self.status_line(2, mark, &info.display_name, info.duration)?;
            }
            records => {
                let mark = if records.iter().all(|record| record.status) {
                    Role::PassMark
                } else {
                    Role::FailMark
                };
                self.status_line(2, mark, &info.display_name, info.duration)?;

                for record in records {
                    if record.status {
                        self.status_line(4, Role::PassMark, &record.name, record.duration)?;
                    } else {
                        self.status_line(4, Role::FailMark, &record.name, record.duration)?;
                        if self.unit_must_pass {
                            break;
                        }
                    }
                }
            }
        }

        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::{strip_ansi, visible_len},
        report::Failure,
        style::{AnsiPalette, PlainPalette},
        unit::{Hook, Unit},
    };

    fn plain() -> ConsoleReporter<Vec<u8>> {
        ConsoleReporter::new(
            vec![],
            Box::new(PlainPalette),
            ConsoleConfig {
                cols: 60,
                precision: 2,
            },
        )
    }

    fn output(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn info(name: &str) -> TestResultInfo {
        TestResultInfo {
            name: name.to_owned(),
            display_name: crate::unit::format_test_name(name),
            duration: Duration::from_millis(250),
            hook: None,
        }
    }

    fn record(name: &str, status: bool) -> AssertionRecord {
        AssertionRecord {
            status,
            name: name.to_owned(),
            result: status.into(),
            expected: true.into(),
            duration: Duration::from_millis(10),
        }
    }

    #[test]
    fn unknown_status_for_operations_without_assertions() {
        let mut reporter = plain();
        reporter.operation_ended(&info("test_nothing"), &[]).unwrap();

        let output = output(reporter);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  ? Nothing - [0.25s]"));
        assert!(lines[0].ends_with("  ??????  "));
        assert!(!lines[0].contains("PASSED"));
        assert!(!lines[0].contains("FAILED"));
        assert_eq!(lines[1], "    No test results found!");
    }

    #[test]
    fn hooks_render_as_passed() {
        let mut reporter = plain();
        let init = TestResultInfo::for_hook(Hook::Init, Duration::from_millis(10));
        reporter.operation_ended(&init, &[]).unwrap();

        let output = output(reporter);
        assert!(output.starts_with("  ✓ Initializer - [0.01s]"));
        assert!(!output.contains("No test results found!"));
    }

    #[test]
    fn single_assertion_has_no_breakdown() {
        let mut reporter = plain();
        reporter
            .operation_ended(&info("testValidLogin"), &[record("Assertion 1", true)])
            .unwrap();

        let output = output(reporter);
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("  ✓ Valid Login - [0.25s]"));
        assert!(output.trim_end().ends_with("PASSED"));
    }

    #[test]
    fn breakdown_stops_at_first_failure_under_must_pass() {
        let mut reporter = plain();
        let records = [
            record("Assertion 1", true),
            record("Assertion 2", false),
            record("Assertion 3", false),
        ];
        reporter.operation_ended(&info("test_many"), &records).unwrap();

        let output = output(reporter);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  ✖ Many"));
        assert!(lines[1].starts_with("    ✓ Assertion 1 - [0.01s]"));
        assert!(lines[2].starts_with("    ✖ Assertion 2"));
        assert!(lines.iter().all(|line| visible_len(line) == 60));
    }

    #[test]
    fn breakdown_lists_every_assertion_without_must_pass() {
        let mut reporter = plain();
        let unit = Unit::<()>::builder("Lenient").must_pass(false).build(());
        reporter.unit_starting(&unit).unwrap();
        let records = [record("Assertion 1", false), record("Assertion 2", false)];
        reporter.operation_ended(&info("test_many"), &records).unwrap();

        assert_eq!(output(reporter).lines().count(), 2 + 1 + 2);
    }

    #[test]
    fn summary_rewrites_the_header_in_place() {
        let mut reporter = ConsoleReporter::new(
            vec![],
            Box::new(AnsiPalette),
            ConsoleConfig {
                cols: 80,
                precision: 5,
            },
        );
        let unit = Unit::<()>::builder("LoginTest").build(());
        reporter.unit_starting(&unit).unwrap();
        reporter.operation_starting("Valid Login").unwrap();
        reporter
            .operation_ended(&info("testValidLogin"), &[record("Assertion 1", true)])
            .unwrap();

        let mut outcome = RunOutcome::new(&unit);
        outcome.group_duration = Duration::from_millis(10);
        reporter.unit_ended(&outcome).unwrap();

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("  > Running Valid Login...\n\x1b[1F"));
        assert!(output.contains("\x1b[2F"));
        assert!(output.ends_with("\x1b[2E"));

        let summary = output.rsplit("\x1b[2F").next().unwrap();
        let summary = summary.trim_end_matches("\x1b[2E");
        assert_eq!(visible_len(summary), 80);
        assert!(strip_ansi(summary).starts_with("✓ LoginTest - 0 sub-tests - [0.01000s]"));
    }

    #[test]
    fn plain_output_appends_the_summary() {
        let mut reporter = plain();
        let unit = Unit::<()>::builder("LoginTest").build(());
        reporter.unit_starting(&unit).unwrap();
        reporter.operation_starting("Valid Login").unwrap();

        let mut outcome = RunOutcome::new(&unit);
        outcome
            .failures
            .insert("test_valid_login".into(), vec![record("Assertion 1", false)]);
        reporter.unit_ended(&outcome).unwrap();

        let output = output(reporter);
        assert!(!output.contains('\x1b'));
        assert!(!output.contains("Running Valid Login"));
        let last = output.lines().last().unwrap();
        assert!(last.starts_with("✖ LoginTest - 0 sub-tests"));
        assert!(last.ends_with("FAILED  "));
    }

    #[test]
    fn failure_banner() {
        let mut reporter = plain();
        let outcome = CollectionOutcome {
            first_failure: Some(Failure {
                unit: "LoginTest".into(),
                info: info("testInvalidLogin"),
                record: AssertionRecord::evaluate("Assertion 1", false, true, Duration::default()),
            }),
            ..CollectionOutcome::default()
        };
        reporter.collection_ended(&outcome).unwrap();

        let output = output(reporter);
        assert!(output.contains("LoginTest: Invalid Login"));
        assert!(output.contains("Failed the assertion Assertion 1"));
        assert!(output.contains("Expected 'true' but resulted in 'false'"));
        assert!(!output.contains("All tests Passed!"));
    }

    #[test]
    fn success_banner() {
        let mut reporter = plain();
        let outcome = CollectionOutcome {
            total_duration: Duration::from_millis(1500),
            ..CollectionOutcome::default()
        };
        reporter.collection_ended(&outcome).unwrap();

        let output = output(reporter);
        assert!(output.contains("All tests Passed! [1.50s]"));
    }

    #[test]
    fn zero_columns_fall_back_to_the_default() {
        let reporter = ConsoleReporter::new(
            vec![],
            Box::new(PlainPalette),
            ConsoleConfig {
                cols: 0,
                precision: 5,
            },
        );
        assert_eq!(reporter.config.cols, DEFAULT_COLS);
    }
}
