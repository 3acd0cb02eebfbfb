//! Manifest loading, layering, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging of local overrides in [`merger`]
//!
//! # Example
//!
//! ```
//! use upgrader::config::{load_manifest, ManifestPaths};
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("upgrader.yml");
//! fs::write(&path, "settings:\n  retry_delay_secs: 1\n").unwrap();
//!
//! let manifest = load_manifest(&ManifestPaths::discover(&path)).unwrap();
//! assert_eq!(manifest.settings.retry_delay_secs, 1);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{load_manifest, parse_manifest, ManifestPaths, DEFAULT_MANIFEST};
pub use merger::{deep_merge, merge_layers};
pub use schema::{ContainerConfig, Manifest, ProbeConfig, Settings, StepConfig};
