//! Classified steps.

use std::fmt;

use serde::Serialize;

use crate::version::VersionInfo;

/// The role a step plays in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRole {
    /// Versioned step that advances the target to its tagged version.
    Upgrade,
    /// Versioned step that validates data state; only run on request.
    IntegrityCheck,
    /// Version-less step invoked by exact name.
    Custom,
}

impl fmt::Display for StepRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepRole::Upgrade => "upgrade",
            StepRole::IntegrityCheck => "integrity check",
            StepRole::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// A discovered, classified step.
///
/// Steps are read-only once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Step name, unique within its role.
    pub name: String,

    /// Container the step was discovered in.
    pub container: String,

    /// Role of the step.
    pub role: StepRole,

    /// Effective version (upgrade and integrity-check steps only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,

    /// Whether the step takes a caller-supplied argument list.
    pub accepts_args: bool,
}

impl Step {
    /// Create an upgrade step.
    pub fn upgrade(container: &str, name: &str, version: VersionInfo) -> Self {
        Self {
            name: name.to_string(),
            container: container.to_string(),
            role: StepRole::Upgrade,
            version: Some(version),
            accepts_args: false,
        }
    }

    /// Create an integrity-check step.
    pub fn integrity_check(container: &str, name: &str, version: VersionInfo) -> Self {
        Self {
            name: name.to_string(),
            container: container.to_string(),
            role: StepRole::IntegrityCheck,
            version: Some(version),
            accepts_args: false,
        }
    }

    /// Create a custom step.
    pub fn custom(container: &str, name: &str, accepts_args: bool) -> Self {
        Self {
            name: name.to_string(),
            container: container.to_string(),
            role: StepRole::Custom,
            version: None,
            accepts_args,
        }
    }

    /// Human-readable label, e.g. `UpgradeTo10 (10.0.0)`.
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{} ({})", self.name, version),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_step_carries_version() {
        let step = Step::upgrade("schema", "UpgradeTo10", "10.0.0".parse().unwrap());
        assert_eq!(step.role, StepRole::Upgrade);
        assert!(!step.accepts_args);
        assert_eq!(step.label(), "UpgradeTo10 (10.0.0)");
    }

    #[test]
    fn custom_step_has_no_version() {
        let step = Step::custom("schema", "Rebuild", true);
        assert!(step.version.is_none());
        assert!(step.accepts_args);
        assert_eq!(step.label(), "Rebuild");
    }

    #[test]
    fn role_display() {
        assert_eq!(StepRole::Upgrade.to_string(), "upgrade");
        assert_eq!(StepRole::IntegrityCheck.to_string(), "integrity check");
        assert_eq!(StepRole::Custom.to_string(), "custom");
    }

    #[test]
    fn step_serializes_without_missing_version() {
        let json = serde_json::to_value(Step::custom("c", "Fix", false)).unwrap();
        assert_eq!(json["role"], "custom");
        assert!(json.get("version").is_none());
    }
}
