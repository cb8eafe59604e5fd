//! Store backup commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use seisclean::backup::{list_backups, read_backup, BackupService};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Backup subcommands.
#[derive(Debug, Subcommand)]
pub enum BackupCommands {
    /// Write one compressed snapshot and prune old ones
    Now,

    /// Take snapshots on an interval until interrupted
    Run {
        /// Override the configured interval
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// List snapshots in the backup directory
    List,

    /// Summarize a snapshot file
    Inspect {
        /// Path to a .json.gz snapshot
        path: PathBuf,
    },
}

/// Run a backup subcommand.
pub fn run(runner: &CliRunner, command: BackupCommands) -> Result<(), CliError> {
    let mut config = runner.config().backup_config();

    match command {
        BackupCommands::Now => {
            let service = BackupService::new(Arc::clone(runner.service().store()), config);
            let path = service.run_once()?;
            println!("Wrote {}", path.display());
        }
        BackupCommands::Run { interval_secs } => {
            if let Some(secs) = interval_secs {
                if secs == 0 {
                    return Err(CliError::Config("interval must be at least 1 second".into()));
                }
                config = config.with_interval(Duration::from_secs(secs));
            }
            println!(
                "Backing up to {} every {}s (Ctrl+C to stop)",
                config.directory.display(),
                config.interval.as_secs()
            );
            let service = Arc::new(BackupService::new(
                Arc::clone(runner.service().store()),
                config,
            ));

            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| CliError::Config(format!("Failed to start runtime: {}", e)))?;
            let token = CancellationToken::new();
            let handler_token = token.clone();
            ctrlc::set_handler(move || {
                println!();
                println!("Received shutdown signal, stopping...");
                handler_token.cancel();
            })
            .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

            runtime.block_on(async move {
                if let Err(e) = service.start(token).await {
                    error!(error = %e, "Backup task ended abnormally");
                }
            });
        }
        BackupCommands::List => {
            let backups = list_backups(&config.directory)?;
            if backups.is_empty() {
                println!("No backups in {}", config.directory.display());
            }
            for path in backups {
                println!("{}", path.display());
            }
        }
        BackupCommands::Inspect { path } => {
            let snapshot = read_backup(&path)?;
            println!("Format:       {}", snapshot.format_version);
            println!("Projects:     {}", snapshot.projects.len());
            println!("Events:       {}", snapshot.events.len());
            println!("Deployments:  {}", snapshot.deployments.len());
            println!("Active links: {}", snapshot.pointers.len());
        }
    }
    Ok(())
}
