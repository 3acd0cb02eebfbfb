//! Plan command implementation.
//!
//! The `upgrader plan` command prints the ordered upgrade steps for a target
//! version without running anything.

use std::path::{Path, PathBuf};

use crate::cli::args::PlanArgs;
use crate::error::{Result, UpgraderError};
use crate::plan::StepSelector;
use crate::ui::UserInterface;

use super::context::Workspace;
use super::dispatcher::{Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    manifest: PathBuf,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(manifest: &Path, args: PlanArgs) -> Self {
        Self {
            manifest: manifest.to_path_buf(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PlanArgs {
        &self.args
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let selector = StepSelector::new(&self.args.target, self.args.source.as_deref())?;
        let workspace = Workspace::load(&self.manifest)?;
        let plan = selector.select(&workspace.catalog);

        if self.args.json {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| UpgraderError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let range = match selector.source() {
            Some(source) => format!("{} to {}", source, selector.target()),
            None => format!("up to {}", selector.target()),
        };
        ui.show_header(&format!("Upgrade plan {}", range));

        if plan.is_empty() {
            ui.message("No upgrade steps to run");
            return Ok(CommandResult::success());
        }

        for (index, step) in plan.steps.iter().enumerate() {
            ui.message(&format!("  {:>3}. {}", index + 1, step.label()));
        }
        let noun = if plan.len() == 1 { "step" } else { "steps" };
        ui.message(&format!("\n{} {}", plan.len(), noun));

        Ok(CommandResult::success())
    }
}
