//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command loads the manifest
//! through [`context::Workspace`], so discovery and validation errors look
//! the same everywhere.

pub mod check;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod list;
pub mod plan;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, EXIT_CONFIG, EXIT_RUN_FAILED};
