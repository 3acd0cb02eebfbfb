//! Manifest discovery and loading.
//!
//! The manifest defaults to `upgrader.yml` in the current directory. A
//! sibling `upgrader.local.yml` (same stem, `.local` inserted before the
//! extension) is merged on top when present, so per-machine settings such as
//! probe addresses stay out of the shared file.

use crate::config::merger::merge_layers;
use crate::config::schema::Manifest;
use crate::error::{Result, UpgraderError};
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "upgrader.yml";

/// Paths of the manifest layers, in merge order.
#[derive(Debug, Clone)]
pub struct ManifestPaths {
    /// The shared manifest
    pub manifest: PathBuf,

    /// Local overrides, if the file exists
    pub local: Option<PathBuf>,
}

impl ManifestPaths {
    /// Resolve the layers for a manifest path.
    pub fn discover(manifest: &Path) -> Self {
        let local = local_override_path(manifest).filter(|p| p.exists());
        Self {
            manifest: manifest.to_path_buf(),
            local,
        }
    }

    /// Directory relative paths in the manifest are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        match self.manifest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// `db/upgrader.yml` → `db/upgrader.local.yml`.
fn local_override_path(manifest: &Path) -> Option<PathBuf> {
    let stem = manifest.file_stem()?.to_str()?;
    let name = match manifest.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.local.{}", stem, ext),
        None => format!("{}.local", stem),
    };
    Some(manifest.with_file_name(name))
}

/// Load one layer as a raw YAML value (for merging).
pub fn load_manifest_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            UpgraderError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            UpgraderError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| UpgraderError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into a [`Manifest`] and validate it.
pub fn parse_manifest(content: &str, source_path: &Path) -> Result<Manifest> {
    let manifest: Manifest =
        serde_yaml::from_str(content).map_err(|e| UpgraderError::ConfigParse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Load the manifest and its local override, merged and validated.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the manifest doesn't exist, `ConfigParse` if
/// any layer is invalid YAML or doesn't match the schema, and
/// `ConfigValidation` if the merged result breaks a cross-field rule.
pub fn load_manifest(paths: &ManifestPaths) -> Result<Manifest> {
    let mut layers = vec![load_manifest_value(&paths.manifest)?];
    if let Some(local) = &paths.local {
        tracing::debug!("Merging local overrides from {}", local.display());
        layers.push(load_manifest_value(local)?);
    }

    let merged = merge_layers(&layers);
    let manifest: Manifest =
        serde_yaml::from_value(merged).map_err(|e| UpgraderError::ConfigParse {
            path: paths.manifest.clone(),
            message: e.to_string(),
        })?;
    manifest.validate()?;
    Ok(manifest)
}
