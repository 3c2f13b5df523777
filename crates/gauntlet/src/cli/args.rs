//! Command line options of a test binary.

use crate::{cli::exit_status::ExitStatus, reporter::ConsoleConfig};
use getopts::Options;
use std::{env, path::Path, str::FromStr};
use termcolor::ColorChoice;

const DEFAULT_COLS: usize = 80;
const DEFAULT_PRECISION: usize = 5;

/// Command line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub list: bool,
    pub filter_pattern: Option<String>,
    pub filter_exact: bool,
    pub skip_patterns: Vec<String>,
    pub color: ColorConfig,
    pub cols: Option<usize>,
    pub precision: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            list: false,
            filter_pattern: None,
            filter_exact: false,
            skip_patterns: vec![],
            color: ColorConfig::Auto,
            cols: None,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Args {
    /// Parse the arguments of the current process.
    pub fn from_env() -> Result<Self, ExitStatus> {
        let args: Vec<_> = env::args().collect();
        Self::from_args(&args)
    }

    /// Parse a list of arguments, the first of which is the program name.
    ///
    /// On `--help` or on malformed arguments, the usage or the error is
    /// printed and the status the process should exit with is returned.
    pub fn from_args(args: &[String]) -> Result<Self, ExitStatus> {
        let parser = Parser::new(args);
        match parser.parse() {
            Ok(Some(args)) => Ok(args),
            Ok(None) => {
                parser.print_usage();
                Err(ExitStatus::OK)
            }
            Err(err) => {
                eprintln!("CLI argument error: {:#}", err);
                Err(ExitStatus::FAILED)
            }
        }
    }

    /// Width of the terminal.
    ///
    /// Taken from `--cols`, then from `$COLUMNS`, then from the terminal
    /// attached to the standard output. A width of zero is never returned.
    pub fn cols(&self) -> usize {
        let from_env = || {
            env::var("COLUMNS")
                .ok()
                .and_then(|cols| cols.trim().parse::<usize>().ok())
        };
        let from_term = || {
            console::Term::stdout()
                .size_checked()
                .map(|(_rows, cols)| usize::from(cols))
        };
        match self.cols.or_else(from_env).or_else(from_term) {
            Some(0) | None => DEFAULT_COLS,
            Some(cols) => cols,
        }
    }

    pub fn color_choice(&self) -> ColorChoice {
        match self.color {
            ColorConfig::Auto => ColorChoice::Auto,
            ColorConfig::Always => ColorChoice::Always,
            ColorConfig::Never => ColorChoice::Never,
        }
    }

    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            cols: self.cols(),
            precision: self.precision,
        }
    }

    pub(crate) fn is_filtered_out(&self, unit_name: &str) -> bool {
        let matches_filter = |pat: &str| {
            if self.filter_exact {
                unit_name == pat
            } else {
                unit_name.contains(pat)
            }
        };

        if self
            .filter_pattern
            .as_ref()
            .map_or(false, |pat| !matches_filter(pat))
        {
            return true;
        }

        self.skip_patterns.iter().any(|pat| matches_filter(pat))
    }
}

/// The color configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ColorConfig {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorConfig::Auto),
            "always" => Ok(ColorConfig::Always),
            "never" => Ok(ColorConfig::Never),
            v => Err(anyhow::anyhow!(
                "argument for --color must be auto, always, or never (was {})",
                v
            )),
        }
    }
}

struct Parser<'a> {
    args: &'a [String],
    opts: Options,
}

impl<'a> Parser<'a> {
    fn new(args: &'a [String]) -> Self {
        let mut opts = Options::new();
        opts.optflag("h", "help", "Display this message");
        opts.optflag("", "list", "List all units and their operations");
        opts.optflag(
            "",
            "exact",
            "Exactly match filters rather than by substring",
        );
        opts.optopt(
            "",
            "color",
            "Configure coloring of output:
                auto   = colorize if stdout is a tty (default);
                always = always colorize output;
                never  = never colorize output;",
            "auto|always|never",
        );
        opts.optopt(
            "",
            "cols",
            "Width of the report, in columns (default: terminal width)",
            "N",
        );
        opts.optopt(
            "",
            "precision",
            "Number of decimals of the reported durations (default: 5)",
            "N",
        );
        opts.optmulti(
            "",
            "skip",
            "Skip units whose names contain FILTER (this flag can be used multiple times)",
            "FILTER",
        );

        // Accepted for compatibility with the built-in test harness, and ignored.
        opts.optflag("", "ignored", "");
        opts.optflag("", "test", "");
        opts.optflag("", "bench", "");
        opts.optflag("", "nocapture", "");
        opts.optflag("q", "quiet", "");
        opts.optopt("", "logfile", "", "PATH");
        opts.optopt("", "test-threads", "", "n_threads");
        opts.optopt("", "format", "", "");
        opts.optopt("Z", "", "", "unstable-options");

        Self { args, opts }
    }

    fn print_usage(&self) {
        let binary = self.args.get(0).map_or("gauntlet", String::as_str);
        let progname = Path::new(binary)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(binary);

        let message = format!("Usage: {} [OPTIONS] [FILTER]", progname);
        eprintln!(
            r#"{usage}
The FILTER string is tested against the name of all units, and only those
units whose names contain the filter are run."#,
            usage = self.opts.usage(&message)
        );
    }

    fn parse(&self) -> anyhow::Result<Option<Args>> {
        let args = &self.args[..];

        let matches = self.opts.parse(args.get(1..).unwrap_or(args))?;
        if matches.opt_present("h") {
            return Ok(None);
        }

        let color = match matches.opt_str("color") {
            Some(color) => color.parse()?,
            None => ColorConfig::Auto,
        };
        let cols = matches
            .opt_get::<usize>("cols")
            .map_err(|err| anyhow::anyhow!("invalid argument for --cols: {}", err))?;
        let precision = matches
            .opt_get::<usize>("precision")
            .map_err(|err| anyhow::anyhow!("invalid argument for --precision: {}", err))?
            .unwrap_or(DEFAULT_PRECISION);

        Ok(Some(Args {
            list: matches.opt_present("list"),
            filter_pattern: matches.free.get(0).cloned(),
            filter_exact: matches.opt_present("exact"),
            skip_patterns: matches.opt_strs("skip"),
            color,
            cols,
            precision,
        }))
    }
}
