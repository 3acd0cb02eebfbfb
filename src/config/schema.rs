//! Manifest schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! manifest file format.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{Result, UpgraderError};

/// Root structure of `upgrader.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Global settings
    pub settings: Settings,

    /// Connectivity probe for the migrated system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeConfig>,

    /// Step containers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerConfig>,
}

impl Manifest {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(probe) = &self.probe {
            if probe.command.is_some() && probe.tcp.is_some() {
                return Err(UpgraderError::ConfigValidation {
                    message: "probe must set either 'command' or 'tcp', not both".to_string(),
                });
            }
        }

        for container in &self.containers {
            if container.name.trim().is_empty() {
                return Err(UpgraderError::ConfigValidation {
                    message: "every container needs a name".to_string(),
                });
            }
            for step in &container.steps {
                if step.command.trim().is_empty() {
                    return Err(UpgraderError::ConfigValidation {
                        message: format!(
                            "step '{}' in container '{}' has no command",
                            step.name, container.name
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds to wait before the single connectivity re-probe
    #[serde(
        default = "default_retry_delay_secs",
        skip_serializing_if = "is_default_retry_delay"
    )]
    pub retry_delay_secs: u64,

    /// Environment variables for step and probe commands
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Working directory for commands (relative to the manifest)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay_secs(),
            env: HashMap::new(),
            working_dir: None,
        }
    }
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn is_default_retry_delay(v: &u64) -> bool {
    *v == default_retry_delay_secs()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn is_false(v: &bool) -> bool {
    !v
}

/// How to check that the migrated system is reachable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Shell command that exits 0 when the target is reachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// `host:port` that must accept a TCP connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp: Option<String>,

    /// Connect timeout for TCP probes
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

/// A named group of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Container name
    pub name: String,

    /// Only marked containers contribute steps
    #[serde(skip_serializing_if = "is_false")]
    pub upgrade_catalog: bool,

    /// Steps in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,
}

/// A single step backed by a shell command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepConfig {
    /// Step name
    pub name: String,

    /// Version at which this upgrade step takes effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_version: Option<String>,

    /// Version this integrity check validates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity_check: Option<String>,

    /// Whether the step receives the caller's arguments
    #[serde(skip_serializing_if = "is_false")]
    pub accepts_args: bool,

    /// Shell command to execute
    pub command: String,

    /// Step-specific environment variables
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Manifest {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = parse("{}");
        assert_eq!(manifest.settings.retry_delay_secs, 5);
        assert!(manifest.probe.is_none());
        assert!(manifest.containers.is_empty());
    }

    #[test]
    fn parses_full_manifest() {
        let manifest = parse(
            r#"
settings:
  retry_delay_secs: 1
  env:
    DB_NAME: wikidb
probe:
  tcp: "localhost:3306"
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: UpgradeTo10
        effective_version: "10.0.0"
        command: "echo up"
      - name: CheckPages
        integrity_check: "11.0.0"
        command: "echo check"
      - name: Rebuild
        accepts_args: true
        command: "echo rebuild"
"#,
        );

        assert_eq!(manifest.settings.retry_delay_secs, 1);
        assert_eq!(manifest.settings.env["DB_NAME"], "wikidb");
        let probe = manifest.probe.as_ref().unwrap();
        assert_eq!(probe.tcp.as_deref(), Some("localhost:3306"));
        assert_eq!(probe.timeout_secs, 5);

        let steps = &manifest.containers[0].steps;
        assert!(manifest.containers[0].upgrade_catalog);
        assert_eq!(steps[0].effective_version.as_deref(), Some("10.0.0"));
        assert_eq!(steps[1].integrity_check.as_deref(), Some("11.0.0"));
        assert!(steps[2].accepts_args);
        manifest.validate().unwrap();
    }

    #[test]
    fn unknown_step_field_is_rejected() {
        let result: std::result::Result<Manifest, _> = serde_yaml::from_str(
            r#"
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: Up
        effective_verison: "1.0"
        command: "echo"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_probe_with_both_kinds() {
        let manifest = parse(
            r#"
probe:
  command: "true"
  tcp: "localhost:1"
"#,
        );
        assert!(matches!(
            manifest.validate(),
            Err(UpgraderError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn validate_rejects_step_without_command() {
        let manifest = parse(
            r#"
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: Up
        effective_version: "1.0"
"#,
        );
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("Up"));
    }

    #[test]
    fn serialization_skips_defaults() {
        let yaml = serde_yaml::to_string(&Manifest::default()).unwrap();
        assert!(!yaml.contains("retry_delay_secs"));
    }
}
