//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::{Result, UpgraderError};
use crate::ui::UserInterface;

/// Exit code for a run that failed.
pub const EXIT_RUN_FAILED: i32 = 1;

/// Exit code for configuration and usage problems.
pub const EXIT_CONFIG: i32 = 2;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Map an error that escaped a command to its exit code.
    pub fn exit_code_for(error: &UpgraderError) -> i32 {
        if error.is_configuration() {
            EXIT_CONFIG
        } else {
            EXIT_RUN_FAILED
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    manifest: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given manifest path.
    pub fn new(manifest: PathBuf) -> Self {
        Self { manifest }
    }

    /// Get the manifest path.
    pub fn manifest(&self) -> &Path {
        &self.manifest
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                let cmd = super::run::RunCommand::new(&self.manifest, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Plan(args)) => {
                let cmd = super::plan::PlanCommand::new(&self.manifest, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::List(args)) => {
                let cmd = super::list::ListCommand::new(&self.manifest, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Check(args)) => {
                let cmd = super::check::CheckCommand::new(&self.manifest, args.clone());
                cmd.execute(ui)
            }
            None => Err(UpgraderError::ConfigValidation {
                message: "no command given (see --help)".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn exit_codes_for_errors() {
        let config = UpgraderError::ConfigNotFound {
            path: PathBuf::from("upgrader.yml"),
        };
        let run = UpgraderError::UnknownStep {
            name: "Foo".to_string(),
        };
        assert_eq!(CommandResult::exit_code_for(&config), EXIT_CONFIG);
        assert_eq!(CommandResult::exit_code_for(&run), EXIT_RUN_FAILED);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("db/upgrader.yml"));
        assert_eq!(dispatcher.manifest(), Path::new("db/upgrader.yml"));
    }
}
