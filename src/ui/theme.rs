//! Visual theme and styling.

use console::Style;

use crate::runner::StepStatus;

/// Upgrader's visual theme.
#[derive(Debug, Clone)]
pub struct UpgraderTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for informational elements (cyan).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for durations and timestamps (dim).
    pub duration: Style,
}

impl Default for UpgraderTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl UpgraderTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            duration: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            duration: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("▲"),
            self.highlight.apply_to(title)
        )
    }

    /// Format one step line, e.g. `✓ UpgradeTo10 (10.0.0) 12ms`.
    pub fn format_step(&self, status: StepStatus, label: &str, detail: &str) -> String {
        let icon = status.display_char();
        let head = match status {
            StepStatus::Applied => self.success.apply_to(format!("{} {}", icon, label)),
            StepStatus::Planned => self.info.apply_to(format!("{} {}", icon, label)),
            StepStatus::Unreachable => self.warning.apply_to(format!("{} {}", icon, label)),
            StepStatus::Failed | StepStatus::Unknown => {
                self.error.apply_to(format!("{} {}", icon, label))
            }
        };

        if detail.is_empty() {
            format!("{}", head)
        } else if status.is_failure() {
            format!("{} - {}", head, detail)
        } else {
            format!("{} {}", head, self.duration.apply_to(detail))
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check if stdout is a TTY
    console::Term::stdout().is_term()
}
