//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_MANIFEST;

/// Upgrader - version-ordered schema migrations.
#[derive(Debug, Parser)]
#[command(name = "upgrader")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Path to the step manifest
    #[arg(
        long,
        global = true,
        env = "UPGRADER_CATALOG",
        default_value = DEFAULT_MANIFEST,
        value_name = "PATH"
    )]
    pub catalog: PathBuf,

    /// Show every step and always print a summary
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Show only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run custom steps and/or upgrade to a target version
    Run(RunArgs),

    /// Show the upgrade steps that would run
    Plan(PlanArgs),

    /// List every step in the catalog
    List(ListArgs),

    /// Run the integrity checks
    Check(CheckArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Version to upgrade to (inclusive)
    #[arg(short, long, value_name = "VERSION")]
    pub target: Option<String>,

    /// Version to resume from (inclusive)
    #[arg(short = 'b', long, value_name = "VERSION", requires = "target")]
    pub source: Option<String>,

    /// Custom steps to run first (comma-separated)
    #[arg(short, long, value_delimiter = ',', value_name = "NAMES")]
    pub custom: Vec<String>,

    /// Log each step before running it
    #[arg(short, long)]
    pub info: bool,

    /// Show what would run without running anything (implies --info)
    #[arg(short = 'f', long)]
    pub dry_run: bool,

    /// Stop at the first unknown custom step
    #[arg(long)]
    pub stop_on_error: bool,

    /// Arguments passed to custom steps that accept them
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl RunArgs {
    /// Whether step names should be logged before each step.
    pub fn verbose(&self) -> bool {
        self.info || self.dry_run
    }
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Version to upgrade to (inclusive)
    #[arg(short, long, value_name = "VERSION")]
    pub target: String,

    /// Version to resume from (inclusive)
    #[arg(short = 'b', long, value_name = "VERSION")]
    pub source: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Show which checks would run without running them
    #[arg(short = 'f', long)]
    pub dry_run: bool,

    /// Log each check before running it
    #[arg(short, long)]
    pub info: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "upgrader",
            "run",
            "-t",
            "11.0.3",
            "-b",
            "10.0.0",
            "-c",
            "CustomA,CustomB",
            "-f",
            "--stop-on-error",
            "--",
            "--param1",
            "value",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.target.as_deref(), Some("11.0.3"));
        assert_eq!(args.source.as_deref(), Some("10.0.0"));
        assert_eq!(args.custom, vec!["CustomA", "CustomB"]);
        assert!(args.dry_run);
        assert!(args.verbose());
        assert!(args.stop_on_error);
        assert_eq!(args.args, vec!["--param1", "value"]);
    }

    #[test]
    fn source_requires_target() {
        assert!(Cli::try_parse_from(["upgrader", "run", "-b", "1.0"]).is_err());
    }

    #[test]
    fn catalog_defaults_to_manifest_name() {
        let cli = Cli::try_parse_from(["upgrader", "list"]).unwrap();
        if std::env::var_os("UPGRADER_CATALOG").is_none() {
            assert_eq!(cli.catalog, PathBuf::from(DEFAULT_MANIFEST));
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "upgrader",
            "plan",
            "--target",
            "10",
            "--catalog",
            "db/steps.yml",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.catalog, PathBuf::from("db/steps.yml"));
        assert!(cli.quiet);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["upgrader", "check", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["upgrader", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn plan_requires_target() {
        assert!(Cli::try_parse_from(["upgrader", "plan"]).is_err());
    }
}
