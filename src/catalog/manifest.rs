//! Steps declared in a YAML manifest and executed as shell commands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use tracing::debug;

use crate::catalog::source::{Arity, Container, Procedure, StepSource, Tag};
use crate::config::{ContainerConfig, Manifest, StepConfig};
use crate::shell::{self, CommandOptions};

/// A [`StepSource`] backed by the `containers` section of a manifest.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    containers: Vec<ContainerConfig>,
    env: HashMap<String, String>,
    cwd: PathBuf,
    capture_output: bool,
}

impl ManifestSource {
    /// Create a source for `manifest`, resolving relative paths against
    /// `base_dir` (normally the manifest's directory).
    pub fn new(manifest: &Manifest, base_dir: &Path) -> Self {
        let cwd = match &manifest.settings.working_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        Self {
            containers: manifest.containers.clone(),
            env: manifest.settings.env.clone(),
            cwd,
            capture_output: false,
        }
    }

    /// Capture step output instead of streaming it to the terminal.
    ///
    /// Captured stderr is included in the error of a failing step.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Directory step commands run in.
    pub fn working_dir(&self) -> &Path {
        &self.cwd
    }

    fn find(&self, container: &str, procedure: &str) -> Option<&StepConfig> {
        self.containers
            .iter()
            .find(|c| c.name == container)?
            .steps
            .iter()
            .find(|s| s.name == procedure)
    }
}

fn to_procedure(step: &StepConfig) -> Procedure {
    let arity = if step.accepts_args {
        Arity::Variadic
    } else {
        Arity::None
    };
    let mut procedure = Procedure::new(&step.name, arity);
    if let Some(version) = &step.effective_version {
        procedure = procedure.with_tag(Tag::EffectiveVersion(version.clone()));
    }
    if let Some(version) = &step.integrity_check {
        procedure = procedure.with_tag(Tag::IntegrityCheck(version.clone()));
    }
    procedure
}

impl StepSource for ManifestSource {
    fn containers(&self) -> crate::Result<Vec<Container>> {
        Ok(self
            .containers
            .iter()
            .map(|c| Container {
                name: c.name.clone(),
                upgrade_catalog: c.upgrade_catalog,
                procedures: c.steps.iter().map(to_procedure).collect(),
            })
            .collect())
    }

    fn invoke(&self, container: &str, procedure: &str, args: &[String]) -> anyhow::Result<()> {
        let step = self
            .find(container, procedure)
            .ok_or_else(|| anyhow!("no step '{}' in container '{}'", procedure, container))?;

        let mut env = self.env.clone();
        env.extend(step.env.clone());

        let options = CommandOptions {
            cwd: Some(self.cwd.clone()),
            env,
            args: args.to_vec(),
            capture_stdout: self.capture_output,
            capture_stderr: self.capture_output,
        };

        debug!("Executing '{}': {}", procedure, step.command);
        let result = shell::execute(&step.command, &options)?;
        if result.success {
            return Ok(());
        }

        let status = match result.exit_code {
            Some(code) => format!("exited with code {}", code),
            None => "was terminated by a signal".to_string(),
        };
        let stderr = result.stderr.trim();
        if stderr.is_empty() {
            bail!("command `{}` {}", step.command, status)
        } else {
            bail!("command `{}` {}: {}", step.command, status, stderr)
        }
    }
}
