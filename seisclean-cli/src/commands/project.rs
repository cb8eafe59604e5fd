//! Project management CLI commands.

use clap::Subcommand;
use console::style;
use seisclean::model::{NewProject, ProjectId, ProjectUpdate};

use super::common::{or_dash, print_json, GeometryArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Project subcommands.
#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Create {
        /// Unique project number
        number: String,

        /// Owning vessel (defaults to --vessel)
        #[arg(long = "for-vessel")]
        vessel_tag: Option<String>,

        /// Descriptive name
        #[arg(long)]
        name: Option<String>,

        /// Free-form comments
        #[arg(long)]
        comments: Option<String>,

        #[command(flatten)]
        geometry: GeometryArgs,
    },

    /// List projects
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Update a project's name, comments or geometry
    Update {
        /// Project id
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        comments: Option<String>,

        #[command(flatten)]
        geometry: GeometryArgs,
    },

    /// Delete a project
    Delete {
        /// Project id
        id: u64,

        /// Also delete its events and deployments
        #[arg(long)]
        cascade: bool,
    },

    /// Make a project the active project of its vessel
    Activate {
        /// Project id
        id: u64,
    },

    /// Clear the active project of the vessel
    Deactivate,

    /// Show the active project of the vessel
    Active,
}

/// Run a project subcommand.
pub fn run(
    runner: &CliRunner,
    vessel: Option<&str>,
    command: ProjectCommands,
) -> Result<(), CliError> {
    let service = runner.service();
    let scope = runner.scope();

    match command {
        ProjectCommands::Create {
            number,
            vessel_tag,
            name,
            comments,
            geometry,
        } => {
            let project = service.create_project(
                scope,
                NewProject {
                    project_number: number,
                    name,
                    vessel_tag: vessel_tag
                        .or_else(|| vessel.map(String::from))
                        .unwrap_or_default(),
                    geometry: geometry.into(),
                    comments,
                },
            )?;
            println!(
                "Created project {} (id {}) for vessel {}",
                style(&project.project_number).bold(),
                project.id,
                project.vessel_tag
            );
        }
        ProjectCommands::List { json } => {
            let projects = service.list_projects(scope, vessel)?;
            if json {
                return print_json(&projects);
            }
            if projects.is_empty() {
                println!("No projects.");
                return Ok(());
            }
            println!(
                "{:>4}  {:<14} {:<10} {:<6} {}",
                "ID", "NUMBER", "VESSEL", "ACTIVE", "NAME"
            );
            for view in projects {
                let p = &view.project;
                let active = if view.is_active {
                    style("yes").green().to_string()
                } else {
                    "no".to_string()
                };
                println!(
                    "{:>4}  {:<14} {:<10} {:<6} {}",
                    p.id.0,
                    p.project_number,
                    p.vessel_tag,
                    active,
                    or_dash(p.name.as_deref())
                );
            }
        }
        ProjectCommands::Update {
            id,
            name,
            comments,
            geometry,
        } => {
            let project = service.update_project(
                scope,
                ProjectId(id),
                ProjectUpdate {
                    name,
                    comments,
                    geometry: geometry.into(),
                },
            )?;
            println!("Updated project {}", project.project_number);
        }
        ProjectCommands::Delete { id, cascade } => {
            let deletion = service.delete_project(scope, ProjectId(id), cascade)?;
            println!(
                "Deleted project {} ({} events, {} deployments removed)",
                id, deletion.events_removed, deletion.deployments_removed
            );
        }
        ProjectCommands::Activate { id } => {
            let project = service.activate_project(scope, ProjectId(id))?;
            println!(
                "Project {} is now active for vessel {}",
                style(&project.project_number).bold(),
                project.vessel_tag
            );
        }
        ProjectCommands::Deactivate => {
            service.deactivate_project(scope, vessel)?;
            println!("Active project cleared");
        }
        ProjectCommands::Active => match service.active_project(scope, vessel)? {
            Some(project) => println!(
                "{} (id {}) {}",
                project.project_number,
                project.id,
                or_dash(project.name.as_deref())
            ),
            None => println!("(no active project)"),
        },
    }
    Ok(())
}
