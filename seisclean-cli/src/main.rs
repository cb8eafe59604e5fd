//! seisclean CLI - Command-line interface
//!
//! Records streamer section cleanings and reports coverage from a local
//! store. Every command runs as a caller with a role and, optionally, a
//! vessel restriction taken from the global flags.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;
use seisclean::AccessScope;

use commands::backup::BackupCommands;
use commands::common::RoleArg;
use commands::config::ConfigCommands;
use commands::deploy::DeployCommands;
use commands::event::EventCommands;
use commands::geometry::GeometryCommands;
use commands::project::ProjectCommands;
use commands::report::{EbArgs, ReportArgs};
use error::CliError;
use runner::{CliRunner, GlobalArgs};

#[derive(Parser)]
#[command(name = "seisclean")]
#[command(about = "Streamer section cleaning log and coverage reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Store file (defaults to store.path from the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Vessel to operate on
    #[arg(long, global = true)]
    vessel: Option<String>,

    /// Caller role
    #[arg(long, global = true, value_enum, default_value = "admin")]
    role: RoleArg,

    /// Restrict the caller to --vessel
    #[arg(long, global = true, requires = "vessel")]
    restricted: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Manage projects and the active project per vessel
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Record, list and edit cleaning events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Show which sections were cleaned and when
    Coverage(ReportArgs),

    /// Show cleaning totals and distance per method
    Stats(ReportArgs),

    /// Show the equipment-box label for a section range
    Eb(EbArgs),

    /// Show or change streamer geometry
    Geometry {
        #[command(subcommand)]
        command: GeometryCommands,
    },

    /// Record streamer deployments
    Deploy {
        #[command(subcommand)]
        command: DeployCommands,
    },

    /// Snapshot the store
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Config { .. } => "config",
            Commands::Project { .. } => "project",
            Commands::Event { .. } => "event",
            Commands::Coverage(_) => "coverage",
            Commands::Stats(_) => "stats",
            Commands::Eb(_) => "eb",
            Commands::Geometry { .. } => "geometry",
            Commands::Deploy { .. } => "deploy",
            Commands::Backup { .. } => "backup",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        store,
        vessel,
        role,
        restricted,
        command,
    } = cli;

    if let Commands::Config { command } = command {
        return commands::config::run(command);
    }

    let scope = match vessel.as_deref() {
        Some(tag) if restricted => AccessScope::for_vessel(role.into(), tag),
        _ => AccessScope::unrestricted(role.into()),
    };
    let runner = CliRunner::new(&GlobalArgs { store, scope })?;
    runner.log_startup(command.name());

    let vessel = vessel.as_deref();
    match command {
        Commands::Config { .. } => Ok(()),
        Commands::Project { command } => commands::project::run(&runner, vessel, command),
        Commands::Event { command } => commands::event::run(&runner, vessel, command),
        Commands::Coverage(args) => commands::report::run_coverage(&runner, vessel, args),
        Commands::Stats(args) => commands::report::run_stats(&runner, vessel, args),
        Commands::Eb(args) => commands::report::run_eb(&runner, vessel, args),
        Commands::Geometry { command } => commands::geometry::run(&runner, vessel, command),
        Commands::Deploy { command } => commands::deploy::run(&runner, command),
        Commands::Backup { command } => commands::backup::run(&runner, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_restricted_requires_vessel() {
        assert!(Cli::try_parse_from(["seisclean", "--restricted", "stats"]).is_err());
        assert!(
            Cli::try_parse_from(["seisclean", "--restricted", "--vessel", "ALPHA", "stats"])
                .is_ok()
        );
    }

    #[test]
    fn test_role_defaults_to_admin() {
        let cli = Cli::try_parse_from(["seisclean", "coverage"]).unwrap();
        assert_eq!(cli.role, RoleArg::Admin);
        assert!(!cli.restricted);
    }

    #[test]
    fn test_event_add_without_type_parses() {
        let cli = Cli::try_parse_from([
            "seisclean", "event", "add", "3", "100", "110", "--method", "rope",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "event");
    }
}
