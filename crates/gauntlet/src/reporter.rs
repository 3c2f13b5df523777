//! Built-in reporters.

mod console;
mod log;

pub use self::{
    console::{ConsoleConfig, ConsoleReporter},
    log::LogReporter,
};
