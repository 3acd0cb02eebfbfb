//! Terminal output for CLI commands.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] for capturing output in tests
//!
//! # Example
//!
//! ```
//! use upgrader::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(OutputMode::Quiet, false);
//! ui.show_header("upgrader");
//! ui.success("Migration complete");
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::{format_duration, OutputMode};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, UpgraderTheme};

use crate::runner::{RunReport, StepReport, StepStatus};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message (shown in every mode).
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show the outcome of one step.
    fn show_step(&mut self, step: &StepReport);

    /// Show the closing summary of a run.
    fn show_summary(&mut self, report: &RunReport);
}

/// One-line summary of a run, e.g. `upgrade: 3 applied in 1.2s`.
pub fn summary_line(report: &RunReport) -> String {
    let total = report.steps.len();
    let noun = if total == 1 { "step" } else { "steps" };
    if report.dry_run {
        return format!("{}: {} {} would run", report.kind, total, noun);
    }

    let failed = report.steps.iter().filter(|s| s.status.is_failure()).count();
    let mut line = format!("{}: {} applied", report.kind, report.applied_count());
    if failed > 0 {
        line.push_str(&format!(", {} failed", failed));
    }
    line.push_str(&format!(" in {}", format_duration(report.duration)));
    line
}

/// Detail text shown after a step's label.
pub fn step_detail(step: &StepReport) -> String {
    match step.status {
        StepStatus::Applied => format_duration(step.duration),
        StepStatus::Planned => "would run".to_string(),
        StepStatus::Failed | StepStatus::Unreachable | StepStatus::Unknown => {
            step.error.clone().unwrap_or_default()
        }
    }
}
