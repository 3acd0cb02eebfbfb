//! Execution planning.
//!
//! A [`StepSelector`] picks the upgrade steps whose version lies between an
//! optional source version and a target version (both inclusive) and orders
//! them into an [`ExecutionPlan`].
//!
//! # Example
//!
//! ```
//! use upgrader::catalog::{Catalog, Registry};
//! use upgrader::plan::StepSelector;
//!
//! let registry = Registry::new().container("schema", |c| {
//!     c.upgrade("AddIndex", "10.0.1", || Ok(()))
//!         .upgrade("CreateTables", "10.0.0", || Ok(()))
//!         .upgrade("DropLegacy", "11.0.0", || Ok(()))
//! });
//! let catalog = Catalog::discover(registry).unwrap();
//!
//! let plan = StepSelector::new("10.0.1", None).unwrap().select(&catalog);
//! assert_eq!(plan.names(), vec!["CreateTables", "AddIndex"]);
//! ```

pub mod selector;

pub use selector::{select_integrity_checks, ExecutionPlan, StepSelector};
