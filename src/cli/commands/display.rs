//! Shared display helpers for run reports.

use crate::runner::RunReport;
use crate::ui::{OutputMode, UserInterface};

/// Print every step line of a report followed by its summary.
///
/// In normal mode planned steps are listed too, since a dry run has nothing
/// else to show.
pub fn show_report(ui: &mut dyn UserInterface, report: &RunReport) {
    for step in &report.steps {
        ui.show_step(step);
    }
    if !report.steps.is_empty() || ui.output_mode() == OutputMode::Verbose {
        ui.show_summary(report);
    }
}

/// Print the error that spoiled a run, if any.
pub fn show_failure(ui: &mut dyn UserInterface, report: &RunReport) {
    if let Some(failure) = &report.failure {
        ui.error(&failure.to_string());
    }
}
