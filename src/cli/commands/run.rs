//! Run command implementation.
//!
//! The `upgrader run` command runs the requested custom steps, then the
//! upgrade plan for the target version.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::args::RunArgs;
use crate::error::{Result, UpgraderError};
use crate::plan::StepSelector;
use crate::runner::{MigrationRunner, RunOptions};
use crate::ui::{OutputMode, UserInterface};

use super::context::Workspace;
use super::dispatcher::{Command, CommandResult};
use super::display::{show_failure, show_report};

/// The run command implementation.
pub struct RunCommand {
    manifest: PathBuf,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(manifest: &Path, args: RunArgs) -> Self {
        Self {
            manifest: manifest.to_path_buf(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn has_custom(&self) -> bool {
        self.args.custom.iter().any(|n| !n.trim().is_empty())
    }

    fn build_options(&self, mode: OutputMode) -> RunOptions {
        RunOptions {
            verbose: self.args.verbose() || mode.shows_detail(),
            dry_run: self.args.dry_run,
            stop_on_first_error: self.args.stop_on_error,
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.has_custom() && self.args.target.is_none() {
            return Err(UpgraderError::ConfigValidation {
                message: "nothing to run: pass --target <VERSION> or --custom <NAMES>".to_string(),
            });
        }

        let selector = self
            .args
            .target
            .as_deref()
            .map(|target| StepSelector::new(target, self.args.source.as_deref()))
            .transpose()?;

        let workspace = Workspace::load(&self.manifest)?;
        let mut runner = MigrationRunner::new(
            &workspace.catalog,
            workspace.probe(),
            self.build_options(ui.output_mode()),
        )
        .with_backoff(workspace.backoff());

        let title = match &selector {
            Some(selector) => format!("Upgrading to {}", selector.target()),
            None => "Running custom steps".to_string(),
        };
        ui.show_header(&title);
        if self.args.dry_run {
            ui.message("Dry run - no steps will be invoked");
        }

        if self.has_custom() {
            let report = runner.run_custom(&self.args.custom, &self.args.args);
            show_report(ui, &report);
            if !report.success() {
                show_failure(ui, &report);
                if selector.is_some() {
                    warn!("Skipping upgrade plan after failed custom steps");
                    ui.warning("Upgrade plan skipped because custom steps failed");
                }
                return Ok(CommandResult::failure(1));
            }
        }

        let Some(selector) = selector else {
            return Ok(CommandResult::success());
        };

        if !self.args.args.is_empty() && !self.has_custom() {
            warn!("Arguments after `--` are only passed to custom steps; ignoring them");
        }

        runner = runner.with_selector(selector);
        let report = runner.migrate()?;
        if report.steps.is_empty() {
            ui.message("No upgrade steps to run");
        }
        show_report(ui, &report);

        if report.success() {
            Ok(CommandResult::success())
        } else {
            show_failure(ui, &report);
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StepStatus;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
settings:
  retry_delay_secs: 0
containers:
  - name: schema
    upgrade_catalog: true
    steps:
      - name: To9
        effective_version: "9.0.0"
        command: "echo 9 >> applied.txt"
      - name: To10
        effective_version: "10.0.0"
        command: "echo 10 >> applied.txt"
      - name: To11
        effective_version: "11.0.0"
        command: "echo 11 >> applied.txt"
      - name: CustomA
        command: "echo custom >> applied.txt"
"#;

    fn setup() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upgrader.yml");
        fs::write(&path, MANIFEST).unwrap();
        (temp, path)
    }

    fn applied(temp: &TempDir) -> String {
        fs::read_to_string(temp.path().join("applied.txt")).unwrap_or_default()
    }

    #[test]
    fn run_requires_target_or_custom() {
        let (_temp, path) = setup();
        let cmd = RunCommand::new(&path, RunArgs::default());
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn run_rejects_invalid_target() {
        let (_temp, path) = setup();
        let args = RunArgs {
            target: Some("ten".to_string()),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let err = RunCommand::new(&path, args).execute(&mut ui).unwrap_err();
        assert!(matches!(err, UpgraderError::VersionFormat { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn run_upgrades_to_target() {
        let (temp, path) = setup();
        let args = RunArgs {
            target: Some("10.0.0".to_string()),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let result = RunCommand::new(&path, args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(applied(&temp), "9\n10\n");
        assert_eq!(ui.steps().len(), 2);
    }

    #[test]
    #[cfg(unix)]
    fn run_custom_then_upgrade() {
        let (temp, path) = setup();
        let args = RunArgs {
            target: Some("11".to_string()),
            source: Some("11".to_string()),
            custom: vec!["CustomA".to_string()],
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let result = RunCommand::new(&path, args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(applied(&temp), "custom\n11\n");
    }

    #[test]
    fn run_unknown_custom_fails_and_skips_upgrade() {
        let (temp, path) = setup();
        let args = RunArgs {
            target: Some("11".to_string()),
            custom: vec!["Foo".to_string()],
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let result = RunCommand::new(&path, args).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert_eq!(applied(&temp), "");
        assert_eq!(ui.steps()[0].1, StepStatus::Unknown);
        assert!(!ui.warnings().is_empty());
    }

    #[test]
    fn verbose_mode_logs_every_step() {
        let cmd = RunCommand::new(Path::new("upgrader.yml"), RunArgs::default());

        assert!(!cmd.build_options(OutputMode::Normal).verbose);
        assert!(cmd.build_options(OutputMode::Verbose).verbose);
    }

    #[test]
    fn verbose_mode_summarizes_empty_plan() {
        let (temp, path) = setup();
        let args = RunArgs {
            target: Some("1".to_string()),
            ..Default::default()
        };

        let mut normal = MockUI::new();
        RunCommand::new(&path, args.clone())
            .execute(&mut normal)
            .unwrap();
        assert!(normal.summaries().is_empty());

        let mut verbose = MockUI::with_mode(OutputMode::Verbose);
        let result = RunCommand::new(&path, args).execute(&mut verbose).unwrap();

        assert!(result.success);
        assert_eq!(applied(&temp), "");
        assert_eq!(verbose.summaries().len(), 1);
        assert!(verbose.summaries()[0].contains("0 applied"));
    }

    #[test]
    fn run_dry_run_invokes_nothing() {
        let (temp, path) = setup();
        let args = RunArgs {
            target: Some("100.0.0".to_string()),
            dry_run: true,
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let result = RunCommand::new(&path, args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(applied(&temp), "");
        assert_eq!(ui.steps().len(), 3);
        assert!(ui.steps().iter().all(|s| s.1 == StepStatus::Planned));
    }

    #[test]
    fn run_missing_manifest_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let args = RunArgs {
            target: Some("1.0".to_string()),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let err = RunCommand::new(&temp.path().join("upgrader.yml"), args)
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, UpgraderError::ConfigNotFound { .. }));
    }
}
