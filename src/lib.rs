//! Upgrader - version-ordered schema migrations.
//!
//! Upgrader discovers upgrade steps from a [`catalog::StepSource`], selects
//! the ones between a source and a target version, and runs them one at a
//! time, checking that the migrated system is reachable before each step.
//!
//! # Modules
//!
//! - [`catalog`] - Step discovery and classification
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Manifest loading, layering, and validation
//! - [`error`] - Error types and result aliases
//! - [`plan`] - Version-bounded step selection
//! - [`runner`] - Step execution, connectivity probes, and run reports
//! - [`shell`] - Shell command execution
//! - [`ui`] - Terminal output
//! - [`version`] - Dotted version numbers and comparison
//!
//! # Example
//!
//! ```
//! use upgrader::catalog::{Catalog, Registry};
//! use upgrader::plan::StepSelector;
//! use upgrader::runner::{AlwaysReachable, MigrationRunner, RunOptions};
//!
//! let registry = Registry::new().container("schema", |c| {
//!     c.upgrade("CreatePages", "10.0.0", || Ok(()))
//!         .upgrade("AddPageIndex", "10.0.1", || Ok(()))
//! });
//! let catalog = Catalog::discover(registry).unwrap();
//!
//! let mut runner = MigrationRunner::new(&catalog, AlwaysReachable, RunOptions::default())
//!     .with_selector(StepSelector::new("10.0.1", None).unwrap());
//! let report = runner.migrate().unwrap();
//! assert_eq!(report.names(), vec!["CreatePages", "AddPageIndex"]);
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod runner;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{Result, UpgraderError};
