//! Error types for upgrader operations.
//!
//! This module defines [`UpgraderError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `UpgraderError` for domain-specific errors that need distinct handling
//! - Failures raised by a step body are carried unaltered in
//!   [`UpgraderError::StepFailed`] so callers can downcast them
//! - Use `anyhow::Error` (via `UpgraderError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for upgrader operations.
#[derive(Debug, Error)]
pub enum UpgraderError {
    /// A version string could not be parsed.
    #[error("Invalid version '{input}': {reason}")]
    VersionFormat { input: String, reason: String },

    /// Step discovery failed (ambiguous or malformed catalog, unreadable source).
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// A requested custom step does not exist in the catalog.
    #[error("Unknown step: {name}")]
    UnknownStep { name: String },

    /// The migration target stayed unreachable after the retry.
    #[error("Target unreachable before step '{step}': {message}")]
    Connectivity { step: String, message: String },

    /// A step body returned an error.
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// Manifest file not found at expected location.
    #[error("Manifest not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse manifest file.
    #[error("Failed to parse manifest at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid configuration or invocation.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// Shell command could not be started.
    #[error("Failed to start command `{command}`: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UpgraderError {
    /// Shorthand for a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Whether this error means the configuration or invocation is wrong,
    /// as opposed to a run that went bad.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::VersionFormat { .. }
                | Self::Catalog { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
        )
    }
}

/// Result type alias for upgrader operations.
pub type Result<T> = std::result::Result<T, UpgraderError>;
