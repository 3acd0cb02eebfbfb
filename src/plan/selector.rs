//! Version-bounded step selection.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Step};
use crate::error::Result;
use crate::version::{VersionChange, VersionInfo};

/// Selects upgrade steps between an optional source and a target version.
///
/// Both bounds are inclusive. A selector can only be built from versions that
/// parse, so an invalid target never produces a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSelector {
    target: VersionInfo,
    source: Option<VersionInfo>,
}

/// The ordered, filtered sequence of upgrade steps for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan<'a> {
    /// Lower bound, if a source version was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VersionInfo>,

    /// Upper bound.
    pub target: VersionInfo,

    /// Steps in execution order.
    pub steps: Vec<&'a Step>,
}

impl<'a> ExecutionPlan<'a> {
    /// Number of steps in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

impl StepSelector {
    /// Parse the target and optional source versions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UpgraderError::VersionFormat`] if either version is
    /// malformed.
    pub fn new(target: &str, source: Option<&str>) -> Result<Self> {
        let target = VersionInfo::parse(target)?;
        let source = source.map(VersionInfo::parse).transpose()?;
        Ok(Self::from_versions(target, source))
    }

    /// Build a selector from already-parsed versions.
    pub fn from_versions(target: VersionInfo, source: Option<VersionInfo>) -> Self {
        Self { target, source }
    }

    /// The inclusive upper bound.
    pub fn target(&self) -> &VersionInfo {
        &self.target
    }

    /// The inclusive lower bound, if any.
    pub fn source(&self) -> Option<&VersionInfo> {
        self.source.as_ref()
    }

    /// Whether `version` falls within `[source, target]`.
    pub fn includes(&self, version: &VersionInfo) -> bool {
        let below_target = matches!(
            self.target.compare(version),
            VersionChange::None | VersionChange::Downgrade
        );
        let above_source = self.source.as_ref().map_or(true, |source| {
            matches!(
                source.compare(version),
                VersionChange::None | VersionChange::Upgrade
            )
        });
        below_target && above_source
    }

    /// Choose the upgrade steps to run, ordered by version then name.
    pub fn select<'a>(&self, catalog: &'a Catalog) -> ExecutionPlan<'a> {
        if let Some(source) = &self.source {
            if source.compare(&self.target) == VersionChange::Downgrade {
                warn!(
                    "Source version {} is above target version {}; nothing to run",
                    source, self.target
                );
            }
        }

        let mut steps: Vec<&Step> = catalog
            .upgrades()
            .filter(|step| step.version.as_ref().is_some_and(|v| self.includes(v)))
            .collect();
        steps.sort_by(|a, b| by_version_then_name(a, b));

        debug!(
            "Selected {} of {} upgrade steps for target {}",
            steps.len(),
            catalog.upgrades().count(),
            self.target
        );

        ExecutionPlan {
            source: self.source.clone(),
            target: self.target.clone(),
            steps,
        }
    }
}

/// All integrity checks in the catalog, ordered by version then name.
pub fn select_integrity_checks(catalog: &Catalog) -> Vec<&Step> {
    let mut checks: Vec<&Step> = catalog.integrity_checks().collect();
    checks.sort_by(|a, b| by_version_then_name(a, b));
    checks
}

fn by_version_then_name(a: &Step, b: &Step) -> Ordering {
    a.version
        .cmp(&b.version)
        .then_with(|| a.name.cmp(&b.name))
}
