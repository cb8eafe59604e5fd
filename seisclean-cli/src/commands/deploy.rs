//! Streamer deployment commands.

use chrono::NaiveDate;
use clap::Subcommand;
use seisclean::model::{ProjectId, StreamerDeployment};

use super::common::{parse_date, print_json};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Deploy subcommands.
#[derive(Debug, Subcommand)]
pub enum DeployCommands {
    /// Record deployment facts for a streamer
    Set {
        /// Project id
        project: u64,
        /// Streamer number
        streamer: u32,

        /// Deployment date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Whether the streamer is coated
        #[arg(long)]
        coated: Option<bool>,
    },

    /// List deployments of a project
    List {
        /// Project id
        project: u64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Run a deploy subcommand.
pub fn run(runner: &CliRunner, command: DeployCommands) -> Result<(), CliError> {
    let service = runner.service();
    let scope = runner.scope();

    match command {
        DeployCommands::Set {
            project,
            streamer,
            date,
            coated,
        } => {
            service.set_deployment(
                scope,
                StreamerDeployment {
                    project_id: ProjectId(project),
                    streamer_id: streamer,
                    deployment_date: date,
                    is_coated: coated,
                },
            )?;
            println!("Set deployment of streamer {} in project {}", streamer, project);
        }
        DeployCommands::List { project, json } => {
            let deployments = service.list_deployments(scope, ProjectId(project))?;
            if json {
                return print_json(&deployments);
            }
            if deployments.is_empty() {
                println!("No deployments.");
                return Ok(());
            }
            println!("{:>8}  {:<10} {}", "STREAMER", "DEPLOYED", "COATED");
            for d in deployments {
                let date = d
                    .deployment_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let coated = match d.is_coated {
                    Some(true) => "yes",
                    Some(false) => "no",
                    None => "-",
                };
                println!("{:>8}  {:<10} {}", d.streamer_id, date, coated);
            }
        }
    }
    Ok(())
}
