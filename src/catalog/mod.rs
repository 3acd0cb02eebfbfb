//! Step discovery and classification.
//!
//! This module turns the procedures exposed by a [`StepSource`] into a
//! read-only [`Catalog`] of classified [`Step`]s:
//!
//! - [`StepSource`] - the capability a source must provide
//! - [`Registry`] - steps registered as Rust closures
//! - [`ManifestSource`] - steps declared in a YAML manifest
//! - [`Catalog`] - the classified snapshot used by a run
//!
//! # Classification
//!
//! Only containers marked as an upgrade catalog are considered. Within them,
//! a procedure tagged with an effective version is an upgrade step, one
//! tagged as an integrity check is an integrity check, and an untagged one is
//! a custom step. Malformed version tags, contradictory tags, and duplicate
//! names are load errors.

pub mod manifest;
pub mod registry;
pub mod source;
pub mod step;

pub use manifest::ManifestSource;
pub use registry::{ContainerBuilder, Registry, StepFn};
pub use source::{Arity, Container, Procedure, StepSource, Tag};
pub use step::{Step, StepRole};

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::error::{Result, UpgraderError};
use crate::version::VersionInfo;

/// The full set of steps available to a run.
pub struct Catalog {
    steps: Vec<Step>,
    source: Box<dyn StepSource>,
}

impl Catalog {
    /// Discover and classify all steps exposed by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`UpgraderError::Catalog`] when the source cannot be read, a
    /// version tag does not parse, a procedure's tags contradict each other,
    /// or two steps of the same role share a name.
    pub fn discover<S>(source: S) -> Result<Self>
    where
        S: StepSource + 'static,
    {
        let containers = source.containers()?;
        let mut steps = Vec::new();
        let mut seen: HashSet<(StepRole, String)> = HashSet::new();

        for container in &containers {
            if !container.upgrade_catalog {
                debug!(
                    "Skipping container '{}' (not an upgrade catalog)",
                    container.name
                );
                continue;
            }

            let mut names_in_container: HashSet<&str> = HashSet::new();
            for procedure in &container.procedures {
                if !names_in_container.insert(procedure.name.as_str()) {
                    return Err(UpgraderError::catalog(format!(
                        "procedure '{}' is declared twice in container '{}'",
                        procedure.name, container.name
                    )));
                }

                let step = classify(&container.name, procedure)?;
                if !seen.insert((step.role, step.name.clone())) {
                    return Err(UpgraderError::catalog(format!(
                        "duplicate {} step '{}'",
                        step.role, step.name
                    )));
                }
                debug!("Discovered {} step '{}'", step.role, step.label());
                steps.push(step);
            }
        }

        Ok(Self {
            steps,
            source: Box::new(source),
        })
    }

    /// All steps in discovery order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps with the given role, in discovery order.
    pub fn by_role(&self, role: StepRole) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.role == role)
    }

    /// Upgrade steps in discovery order.
    pub fn upgrades(&self) -> impl Iterator<Item = &Step> {
        self.by_role(StepRole::Upgrade)
    }

    /// Integrity-check steps in discovery order.
    pub fn integrity_checks(&self) -> impl Iterator<Item = &Step> {
        self.by_role(StepRole::IntegrityCheck)
    }

    /// Custom steps in discovery order.
    pub fn customs(&self) -> impl Iterator<Item = &Step> {
        self.by_role(StepRole::Custom)
    }

    /// Look up a step by role and exact name.
    pub fn get(&self, role: StepRole, name: &str) -> Option<&Step> {
        self.by_role(role).find(|s| s.name == name)
    }

    /// Look up a custom step by exact name.
    pub fn custom(&self, name: &str) -> Option<&Step> {
        self.get(StepRole::Custom, name)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the catalog holds no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Invoke a step through its source.
    pub fn invoke(&self, step: &Step, args: &[String]) -> anyhow::Result<()> {
        self.source.invoke(&step.container, &step.name, args)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Classify one procedure of a marked container.
fn classify(container: &str, procedure: &Procedure) -> Result<Step> {
    let name = procedure.name.as_str();
    if name.trim().is_empty() {
        return Err(UpgraderError::catalog(format!(
            "container '{}' has a procedure without a name",
            container
        )));
    }

    match procedure.tags.as_slice() {
        [] => Ok(Step::custom(
            container,
            name,
            procedure.arity == Arity::Variadic,
        )),
        [tag] => {
            if procedure.arity != Arity::None {
                return Err(UpgraderError::catalog(format!(
                    "versioned step '{}' must not take arguments",
                    name
                )));
            }
            match tag {
                Tag::EffectiveVersion(text) => {
                    Ok(Step::upgrade(container, name, parse_tag(name, text)?))
                }
                Tag::IntegrityCheck(text) => {
                    Ok(Step::integrity_check(container, name, parse_tag(name, text)?))
                }
            }
        }
        _ => Err(UpgraderError::catalog(format!(
            "step '{}' carries {} role tags; expected at most one",
            name,
            procedure.tags.len()
        ))),
    }
}

fn parse_tag(step: &str, text: &str) -> Result<VersionInfo> {
    VersionInfo::parse(text).map_err(|e| {
        UpgraderError::catalog(format!("step '{}' has a malformed version tag: {}", step, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreadable;

    impl StepSource for Unreadable {
        fn containers(&self) -> Result<Vec<Container>> {
            Err(UpgraderError::catalog("source could not be opened"))
        }

        fn invoke(&self, _: &str, _: &str, _: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn sample() -> Registry {
        Registry::new()
            .container("schema", |c| {
                c.custom("CustomMethod1", || Ok(()))
                    .custom_with_args("CustomMethod2", |_| Ok(()))
                    .integrity_check("DataIntegrityMethod1", "11.0.0", || Ok(()))
                    .upgrade("UpgradeMethod1", "10.0.0", || Ok(()))
                    .upgrade("UpgradeMethod2", "10.0.1", || Ok(()))
            })
            .unmarked_container("helpers", |c| {
                c.upgrade("NotAStep", "1.0.0", || Ok(()))
            })
    }

    #[test]
    fn discover_classifies_by_tag() {
        let catalog = Catalog::discover(sample()).unwrap();

        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.upgrades().count(), 2);
        assert_eq!(catalog.integrity_checks().count(), 1);
        assert_eq!(catalog.customs().count(), 2);

        let custom = catalog.custom("CustomMethod2").unwrap();
        assert!(custom.accepts_args);
        assert!(custom.version.is_none());

        let check = catalog
            .get(StepRole::IntegrityCheck, "DataIntegrityMethod1")
            .unwrap();
        assert_eq!(check.version.as_ref().unwrap().to_string(), "11.0.0");
    }

    #[test]
    fn discover_skips_unmarked_containers() {
        let catalog = Catalog::discover(sample()).unwrap();
        assert!(catalog.steps().iter().all(|s| s.name != "NotAStep"));
    }

    #[test]
    fn discover_without_marked_container_is_empty() {
        let registry = Registry::new().unmarked_container("helpers", |c| {
            c.upgrade("Up", "1.0", || Ok(()))
        });
        let catalog = Catalog::discover(registry).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn discover_rejects_malformed_version_tag() {
        let registry =
            Registry::new().container("schema", |c| c.upgrade("Broken", "10.x", || Ok(())));
        let err = Catalog::discover(registry).unwrap_err();
        assert!(matches!(err, UpgraderError::Catalog { .. }));
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn discover_rejects_malformed_integrity_tag() {
        let registry = Registry::new()
            .container("schema", |c| c.integrity_check("Check", "", || Ok(())));
        assert!(Catalog::discover(registry).is_err());
    }

    #[test]
    fn discover_rejects_duplicate_names_within_role() {
        let registry = Registry::new()
            .container("a", |c| c.upgrade("Same", "1.0", || Ok(())))
            .container("b", |c| c.upgrade("Same", "2.0", || Ok(())));
        let err = Catalog::discover(registry).unwrap_err();
        assert!(err.to_string().contains("duplicate upgrade step 'Same'"));
    }

    #[test]
    fn discover_allows_same_name_across_roles() {
        let registry = Registry::new()
            .container("a", |c| c.upgrade("Pages", "1.0", || Ok(())))
            .container("b", |c| c.custom("Pages", || Ok(())));
        let catalog = Catalog::discover(registry).unwrap();
        assert!(catalog.get(StepRole::Upgrade, "Pages").is_some());
        assert!(catalog.custom("Pages").is_some());
    }

    #[test]
    fn discover_rejects_duplicate_procedure_in_container() {
        let registry = Registry::new().container("a", |c| {
            c.upgrade("Pages", "1.0", || Ok(()))
                .custom("Pages", || Ok(()))
        });
        assert!(Catalog::discover(registry).is_err());
    }

    #[test]
    fn discover_rejects_conflicting_tags() {
        let procedure = Procedure::new("Both", Arity::None)
            .with_tag(Tag::EffectiveVersion("1.0".into()))
            .with_tag(Tag::IntegrityCheck("1.0".into()));
        let registry = Registry::new().container("a", |c| c.procedure(procedure, |_| Ok(())));
        let err = Catalog::discover(registry).unwrap_err();
        assert!(err.to_string().contains("role tags"));
    }

    #[test]
    fn discover_rejects_versioned_step_with_arguments() {
        let procedure = Procedure::new("Up", Arity::Variadic)
            .with_tag(Tag::EffectiveVersion("1.0".into()));
        let registry = Registry::new().container("a", |c| c.procedure(procedure, |_| Ok(())));
        assert!(Catalog::discover(registry).is_err());
    }

    #[test]
    fn discover_propagates_unreadable_source() {
        let err = Catalog::discover(Unreadable).unwrap_err();
        assert!(matches!(err, UpgraderError::Catalog { .. }));
    }

    #[test]
    fn invoke_delegates_to_source() {
        let registry =
            Registry::new().container("schema", |c| c.custom("Fail", || anyhow::bail!("nope")));
        let catalog = Catalog::discover(registry).unwrap();
        let step = catalog.custom("Fail").unwrap();
        assert_eq!(catalog.invoke(step, &[]).unwrap_err().to_string(), "nope");
    }
}
