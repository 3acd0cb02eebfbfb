//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::runner::{RunReport, StepReport, StepStatus};

use super::{
    should_use_colors, step_detail, summary_line, OutputMode, UpgraderTheme, UserInterface,
};

/// Terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    errors: Term,
    theme: UpgraderTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, no_color: bool) -> Self {
        let theme = if !no_color && should_use_colors() {
            UpgraderTheme::new()
        } else {
            UpgraderTheme::plain()
        };

        Self {
            term: Term::stdout(),
            errors: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.errors, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step(&mut self, step: &StepReport) {
        if !self.mode.shows_status() && !step.status.is_failure() {
            return;
        }
        let line = self
            .theme
            .format_step(step.status, &step.label(), &step_detail(step));
        let target = if step.status == StepStatus::Failed {
            &mut self.errors
        } else {
            &mut self.term
        };
        writeln!(target, "  {}", line).ok();
    }

    fn show_summary(&mut self, report: &RunReport) {
        if !self.mode.shows_status() {
            return;
        }
        let line = summary_line(report);
        let formatted = if report.success() {
            self.theme.format_success(&line)
        } else {
            self.theme.format_warning(&line)
        };
        writeln!(self.term, "\n{}", formatted).ok();
    }
}

/// Create a terminal UI for the given mode.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode, no_color))
}
