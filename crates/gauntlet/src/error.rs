use std::{error, fmt, io};

/// What went wrong while executing the body of an operation or hook.
#[derive(Debug)]
pub enum Cause {
    Errored(anyhow::Error),
    Panicked(String),
}

/// An operation or hook that did not run to completion.
///
/// Unlike failing assertions, which are recorded and reported, this aborts
/// the run of the unit.
#[derive(Debug)]
pub struct OperationFailure {
    pub unit: String,
    pub operation: String,
    pub cause: Cause,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause {
            Cause::Errored(ref err) => {
                write!(f, "{}: {} errored: {:#}", self.unit, self.operation, err)
            }
            Cause::Panicked(ref msg) => {
                write!(f, "{}: {} panicked: {}", self.unit, self.operation, msg)
            }
        }
    }
}

impl error::Error for OperationFailure {}

/// Errors that terminate a collection run.
#[derive(Debug)]
pub enum RunError {
    Operation(OperationFailure),
    Io(io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Operation(failure) => fmt::Display::fmt(failure, f),
            RunError::Io(err) => write!(f, "failed to write the report: {}", err),
        }
    }
}

impl error::Error for RunError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RunError::Operation(failure) => Some(failure),
            RunError::Io(err) => Some(err),
        }
    }
}

impl From<OperationFailure> for RunError {
    fn from(failure: OperationFailure) -> Self {
        RunError::Operation(failure)
    }
}

impl From<io::Error> for RunError {
    fn from(err: io::Error) -> Self {
        RunError::Io(err)
    }
}
