//! Migration orchestration.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Step};
use crate::error::{Result, UpgraderError};
use crate::plan::{ExecutionPlan, StepSelector};

use super::probe::ConnectivityProbe;
use super::report::{RunKind, RunReport, StepReport};

/// Wait before the single connectivity re-probe.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Options for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Log each step name at info level before attempting it.
    pub verbose: bool,

    /// Report what would run without probing or invoking anything.
    pub dry_run: bool,

    /// Stop a custom run at the first unknown step.
    pub stop_on_first_error: bool,
}

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has happened yet.
    Idle,
    /// Selecting steps.
    Planning,
    /// Invoking steps.
    Executing,
    /// The last run finished without errors.
    Completed,
    /// The last run (or plan) ended with an error.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Planning => "planning",
            RunState::Executing => "executing",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Runs upgrade plans, custom steps, and integrity checks against a catalog.
///
/// Steps run strictly one at a time in plan order. Nothing is rolled back:
/// when a run stops early, the steps before the failure stay applied.
pub struct MigrationRunner<'a, P> {
    catalog: &'a Catalog,
    probe: P,
    selector: Option<StepSelector>,
    options: RunOptions,
    backoff: Duration,
    state: RunState,
}

impl<'a, P: ConnectivityProbe> MigrationRunner<'a, P> {
    /// Create a runner over `catalog` that checks reachability with `probe`.
    pub fn new(catalog: &'a Catalog, probe: P, options: RunOptions) -> Self {
        Self {
            catalog,
            probe,
            selector: None,
            options,
            backoff: DEFAULT_BACKOFF,
            state: RunState::Idle,
        }
    }

    /// Set the version bounds for [`plan`](Self::plan) and
    /// [`migrate`](Self::migrate).
    pub fn with_selector(mut self, selector: StepSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Override the wait before re-probing an unreachable target.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run options.
    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Select the upgrade steps for the configured version bounds.
    ///
    /// # Errors
    ///
    /// Returns [`UpgraderError::ConfigValidation`] if no target version was
    /// given.
    pub fn plan(&mut self) -> Result<ExecutionPlan<'a>> {
        self.state = RunState::Planning;
        let Some(selector) = &self.selector else {
            self.state = RunState::Failed;
            return Err(UpgraderError::ConfigValidation {
                message: "no target version".to_string(),
            });
        };

        let plan = selector.select(self.catalog);
        debug!("Planned {} upgrade steps", plan.len());
        Ok(plan)
    }

    /// Plan, then run the plan.
    pub fn migrate(&mut self) -> Result<RunReport> {
        let plan = self.plan()?;
        Ok(self.run_upgrade(&plan))
    }

    /// Run upgrade steps in plan order, probing the target before each one.
    ///
    /// If the target is unreachable, the runner waits once for the backoff
    /// interval and probes again; a second failure aborts the run at that
    /// step.
    pub fn run_upgrade(&mut self, plan: &ExecutionPlan<'_>) -> RunReport {
        self.state = RunState::Executing;
        let mut report = RunReport::start(RunKind::Upgrade, self.options.dry_run);
        let started = Instant::now();

        for step in &plan.steps {
            self.announce(step);
            if self.options.dry_run {
                report.steps.push(StepReport::planned(step));
                continue;
            }

            if let Err(e) = self.ensure_reachable(step) {
                warn!("Aborting before '{}': target unreachable", step.name);
                report.steps.push(StepReport::unreachable(step, &e));
                report.record_failure(UpgraderError::Connectivity {
                    step: step.name.clone(),
                    message: format!("{:#}", e),
                });
                break;
            }

            if !self.invoke(step, &[], &mut report) {
                break;
            }
        }

        self.finish(report, started)
    }

    /// Run custom steps by exact name, in the order given.
    ///
    /// Names are trimmed and empty names ignored. An unknown name is reported
    /// as such; the remaining names still run unless `stop_on_first_error`
    /// is set. A step that fails halts the run.
    pub fn run_custom<S: AsRef<str>>(&mut self, names: &[S], args: &[String]) -> RunReport {
        self.state = RunState::Executing;
        let mut report = RunReport::start(RunKind::Custom, self.options.dry_run);
        let started = Instant::now();

        for name in names.iter().map(|n| n.as_ref().trim()) {
            if name.is_empty() {
                continue;
            }

            let Some(step) = self.catalog.custom(name) else {
                warn!("Unknown custom step '{}'", name);
                report.steps.push(StepReport::unknown(name));
                report.record_failure(UpgraderError::UnknownStep {
                    name: name.to_string(),
                });
                if self.options.stop_on_first_error {
                    break;
                }
                continue;
            };

            self.announce(step);
            if self.options.dry_run {
                report.steps.push(StepReport::planned(step));
                continue;
            }

            let step_args: &[String] = if step.accepts_args {
                args
            } else {
                if !args.is_empty() {
                    warn!(
                        "Custom step '{}' takes no arguments; ignoring {} supplied",
                        step.name,
                        args.len()
                    );
                }
                &[]
            };

            if !self.invoke(step, step_args, &mut report) {
                break;
            }
        }

        self.finish(report, started)
    }

    /// Run integrity checks in the order given.
    ///
    /// No version filtering and no connectivity retry apply.
    pub fn run_integrity_checks(&mut self, checks: &[&Step]) -> RunReport {
        self.state = RunState::Executing;
        let mut report = RunReport::start(RunKind::IntegrityCheck, self.options.dry_run);
        let started = Instant::now();

        for step in checks {
            self.announce(step);
            if self.options.dry_run {
                report.steps.push(StepReport::planned(step));
                continue;
            }
            if !self.invoke(step, &[], &mut report) {
                break;
            }
        }

        self.finish(report, started)
    }

    fn announce(&self, step: &Step) {
        let prefix = if self.options.dry_run {
            "Would run"
        } else {
            "Running"
        };
        if self.options.verbose || self.options.dry_run {
            info!("{} {} step {}", prefix, step.role, step.label());
        } else {
            debug!("{} {} step {}", prefix, step.role, step.label());
        }
    }

    fn ensure_reachable(&self, step: &Step) -> anyhow::Result<()> {
        let Err(first) = self.probe.probe() else {
            return Ok(());
        };

        warn!(
            "Target unreachable before '{}' ({:#}); retrying in {:?}",
            step.name, first, self.backoff
        );
        thread::sleep(self.backoff);
        self.probe.probe()
    }

    /// Invoke one step and record the outcome. Returns false if it failed.
    fn invoke(&self, step: &Step, args: &[String], report: &mut RunReport) -> bool {
        let start = Instant::now();
        match self.catalog.invoke(step, args) {
            Ok(()) => {
                let duration = start.elapsed();
                debug!("Step '{}' applied in {:?}", step.name, duration);
                report.steps.push(StepReport::applied(step, duration));
                true
            }
            Err(e) => {
                warn!("Step '{}' failed: {:#}", step.name, e);
                report
                    .steps
                    .push(StepReport::failed(step, start.elapsed(), &e));
                report.record_failure(UpgraderError::StepFailed {
                    step: step.name.clone(),
                    source: e,
                });
                false
            }
        }
    }

    fn finish(&mut self, mut report: RunReport, started: Instant) -> RunReport {
        report.duration = started.elapsed();
        self.state = if report.success() {
            RunState::Completed
        } else {
            RunState::Failed
        };
        report
    }
}

impl<P> fmt::Debug for MigrationRunner<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("selector", &self.selector)
            .field("options", &self.options)
            .field("backoff", &self.backoff)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
