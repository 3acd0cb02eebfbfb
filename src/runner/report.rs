//! Per-step outcomes and run reports.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Step;
use crate::error::{Result, UpgraderError};
use crate::version::VersionInfo;

/// Outcome of a single step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Dry run: the step would have run.
    Planned,

    /// Step was invoked and succeeded.
    Applied,

    /// Step was invoked and failed.
    Failed,

    /// Step was not attempted because the target could not be reached.
    Unreachable,

    /// No custom step with the requested name exists.
    Unknown,
}

impl StepStatus {
    /// Whether this outcome counts against the run.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepStatus::Failed | StepStatus::Unreachable | StepStatus::Unknown
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Planned => '○',
            StepStatus::Applied => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Unreachable => '⊘',
            StepStatus::Unknown => '?',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Planned => "planned",
            StepStatus::Applied => "applied",
            StepStatus::Failed => "failed",
            StepStatus::Unreachable => "unreachable",
            StepStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Step name (as requested, for unknown custom steps).
    pub name: String,

    /// Effective version, for versioned steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionInfo>,

    /// Outcome.
    pub status: StepStatus,

    /// Time spent invoking the step.
    #[serde(with = "millis")]
    pub duration: Duration,

    /// Error message, if the step did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    fn for_step(step: &Step, status: StepStatus) -> Self {
        Self {
            name: step.name.clone(),
            version: step.version.clone(),
            status,
            duration: Duration::ZERO,
            error: None,
        }
    }

    /// The step would have run (dry run).
    pub fn planned(step: &Step) -> Self {
        Self::for_step(step, StepStatus::Planned)
    }

    /// The step ran and succeeded.
    pub fn applied(step: &Step, duration: Duration) -> Self {
        Self {
            duration,
            ..Self::for_step(step, StepStatus::Applied)
        }
    }

    /// The step ran and failed.
    pub fn failed(step: &Step, duration: Duration, error: &anyhow::Error) -> Self {
        Self {
            duration,
            error: Some(format!("{:#}", error)),
            ..Self::for_step(step, StepStatus::Failed)
        }
    }

    /// The step was not attempted because the target was unreachable.
    pub fn unreachable(step: &Step, error: &anyhow::Error) -> Self {
        Self {
            error: Some(format!("{:#}", error)),
            ..Self::for_step(step, StepStatus::Unreachable)
        }
    }

    /// No custom step named `name` exists.
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            status: StepStatus::Unknown,
            duration: Duration::ZERO,
            error: Some(format!("no custom step named '{}'", name)),
        }
    }

    /// `name (version)` for versioned steps, otherwise `name`.
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{} ({})", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// Which path produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Version-ordered upgrade plan.
    Upgrade,
    /// Explicitly named custom steps.
    Custom,
    /// Integrity checks.
    IntegrityCheck,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunKind::Upgrade => "upgrade",
            RunKind::Custom => "custom",
            RunKind::IntegrityCheck => "integrity check",
        };
        write!(f, "{}", s)
    }
}

/// Result of one run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Which path ran.
    pub kind: RunKind,

    /// Outcomes in execution order.
    pub steps: Vec<StepReport>,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total wall time.
    #[serde(with = "millis")]
    pub duration: Duration,

    /// The error that halted the run, or the first per-step error.
    #[serde(skip)]
    pub failure: Option<UpgraderError>,
}

impl RunReport {
    pub(crate) fn start(kind: RunKind, dry_run: bool) -> Self {
        Self {
            kind,
            steps: Vec::new(),
            dry_run,
            started_at: Utc::now(),
            duration: Duration::ZERO,
            failure: None,
        }
    }

    /// Whether every step succeeded (or would have, in a dry run).
    pub fn success(&self) -> bool {
        self.failure.is_none() && !self.steps.iter().any(|s| s.status.is_failure())
    }

    /// Steps with the given status.
    pub fn with_status(&self, status: StepStatus) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(move |s| s.status == status)
    }

    /// Number of steps that were invoked and succeeded.
    pub fn applied_count(&self) -> usize {
        self.with_status(StepStatus::Applied).count()
    }

    /// Names of steps in report order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Record an error, keeping the first one.
    pub(crate) fn record_failure(&mut self, error: UpgraderError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    /// Convert into the step outcomes, or the error that spoiled the run.
    pub fn into_result(self) -> Result<Vec<StepReport>> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(self.steps),
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
