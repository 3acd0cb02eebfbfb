//! List command implementation.
//!
//! The `upgrader list` command lists the catalog grouped by role.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{Step, StepRole};
use crate::cli::args::ListArgs;
use crate::error::{Result, UpgraderError};
use crate::plan::select_integrity_checks;
use crate::ui::theme::UpgraderTheme;
use crate::ui::{should_use_colors, UserInterface};

use super::context::Workspace;
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    manifest: PathBuf,
    args: ListArgs,
}

#[derive(Serialize)]
struct Listing<'a> {
    upgrades: Vec<&'a Step>,
    integrity_checks: Vec<&'a Step>,
    custom: Vec<&'a Step>,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(manifest: &Path, args: ListArgs) -> Self {
        Self {
            manifest: manifest.to_path_buf(),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

fn show_group(ui: &mut dyn UserInterface, theme: &UpgraderTheme, title: &str, steps: &[&Step]) {
    ui.message(&format!("  {}", theme.highlight.apply_to(title)));
    if steps.is_empty() {
        ui.message(&format!("    {}", theme.dim.apply_to("(none)")));
    }
    for step in steps {
        let suffix = if step.role == StepRole::Custom && step.accepts_args {
            format!(" {}", theme.dim.apply_to("[args]"))
        } else {
            String::new()
        };
        ui.message(&format!("    {}{}", step.label(), suffix));
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let workspace = Workspace::load(&self.manifest)?;
        let catalog = &workspace.catalog;

        let mut upgrades: Vec<&Step> = catalog.upgrades().collect();
        upgrades.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));
        let listing = Listing {
            upgrades,
            integrity_checks: select_integrity_checks(catalog),
            custom: catalog.customs().collect(),
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| UpgraderError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        if catalog.is_empty() {
            ui.warning(&format!(
                "No steps found in {} (is a container marked upgrade_catalog?)",
                workspace.path.display()
            ));
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            UpgraderTheme::new()
        } else {
            UpgraderTheme::plain()
        };
        show_group(ui, &theme, "Upgrade steps:", &listing.upgrades);
        show_group(ui, &theme, "Integrity checks:", &listing.integrity_checks);
        show_group(ui, &theme, "Custom steps:", &listing.custom);

        Ok(CommandResult::success())
    }
}
