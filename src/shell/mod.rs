//! Shell command execution for manifest-defined steps and probes.

pub mod command;

pub use command::{execute, CommandOptions, CommandResult};
