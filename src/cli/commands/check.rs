//! Check command implementation.
//!
//! The `upgrader check` command runs every integrity check in version order.

use std::path::{Path, PathBuf};

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::plan::select_integrity_checks;
use crate::runner::{MigrationRunner, RunOptions};
use crate::ui::UserInterface;

use super::context::Workspace;
use super::dispatcher::{Command, CommandResult};
use super::display::{show_failure, show_report};

/// The check command implementation.
pub struct CheckCommand {
    manifest: PathBuf,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(manifest: &Path, args: CheckArgs) -> Self {
        Self {
            manifest: manifest.to_path_buf(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &CheckArgs {
        &self.args
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let workspace = Workspace::load(&self.manifest)?;
        let checks = select_integrity_checks(&workspace.catalog);

        ui.show_header("Integrity checks");
        if checks.is_empty() {
            ui.message("No integrity checks defined");
            return Ok(CommandResult::success());
        }

        let options = RunOptions {
            verbose: self.args.info || self.args.dry_run || ui.output_mode().shows_detail(),
            dry_run: self.args.dry_run,
            stop_on_first_error: false,
        };
        let mut runner = MigrationRunner::new(&workspace.catalog, workspace.probe(), options);
        let report = runner.run_integrity_checks(&checks);
        show_report(ui, &report);

        if report.success() {
            Ok(CommandResult::success())
        } else {
            show_failure(ui, &report);
            Ok(CommandResult::failure(1))
        }
    }
}
