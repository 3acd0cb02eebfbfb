//! Manifest loading shared by every command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{Catalog, ManifestSource};
use crate::config::{load_manifest, Manifest, ManifestPaths};
use crate::error::Result;
use crate::runner::{probe, ConnectivityProbe};

/// A loaded manifest and the catalog discovered from it.
#[derive(Debug)]
pub struct Workspace {
    /// Path of the manifest that was loaded.
    pub path: PathBuf,

    /// Merged manifest.
    pub manifest: Manifest,

    /// Classified steps.
    pub catalog: Catalog,

    working_dir: PathBuf,
}

impl Workspace {
    /// Load the manifest at `path` (plus its local override) and discover
    /// its steps.
    pub fn load(path: &Path) -> Result<Self> {
        let paths = ManifestPaths::discover(path);
        let manifest = load_manifest(&paths)?;
        tracing::debug!(
            "Loaded manifest {} ({} containers)",
            path.display(),
            manifest.containers.len()
        );

        let source = ManifestSource::new(&manifest, &paths.base_dir());
        let working_dir = source.working_dir().to_path_buf();
        let catalog = Catalog::discover(source)?;

        Ok(Self {
            path: path.to_path_buf(),
            manifest,
            catalog,
            working_dir,
        })
    }

    /// The connectivity probe configured in the manifest.
    pub fn probe(&self) -> Box<dyn ConnectivityProbe> {
        probe::from_config(
            self.manifest.probe.as_ref(),
            &self.manifest.settings,
            self.working_dir.clone(),
        )
    }

    /// Wait before re-probing an unreachable target.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.manifest.settings.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpgraderError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_discovers_catalog_and_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upgrader.yml");
        fs::write(
            &path,
            r#"
settings:
  retry_delay_secs: 0
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: Up
        effective_version: "1.0"
        command: "exit 0"
"#,
        )
        .unwrap();

        let workspace = Workspace::load(&path).unwrap();
        assert_eq!(workspace.catalog.len(), 1);
        assert_eq!(workspace.backoff(), Duration::ZERO);
        assert!(workspace.probe().probe().is_ok());
    }

    #[test]
    fn load_reports_catalog_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upgrader.yml");
        fs::write(
            &path,
            r#"
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: Up
        effective_version: "1.x"
        command: "exit 0"
"#,
        )
        .unwrap();

        assert!(matches!(
            Workspace::load(&path),
            Err(UpgraderError::Catalog { .. })
        ));
    }
}
