//! Step execution orchestration.
//!
//! - [`MigrationRunner`] drives upgrade plans, custom steps, and integrity
//!   checks, one step at a time
//! - [`ConnectivityProbe`] implementations check the target before each
//!   upgrade step
//! - [`RunReport`] records what happened to every step

pub mod migration;
pub mod probe;
pub mod report;

pub use migration::{MigrationRunner, RunOptions, RunState, DEFAULT_BACKOFF};
pub use probe::{AlwaysReachable, CommandProbe, ConnectivityProbe, FnProbe, TcpProbe};
pub use report::{RunKind, RunReport, StepReport, StepStatus};
