//! Streamer geometry commands.

use clap::Subcommand;
use seisclean::geometry::ConfigTarget;
use seisclean::GeometryOverrides;

use super::common::{print_json, GeometryArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Geometry subcommands.
#[derive(Debug, Subcommand)]
pub enum GeometryCommands {
    /// Show the effective geometry
    Show {
        /// Use this project instead of the vessel's active one
        #[arg(long)]
        project: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Change the active project's geometry, or the global defaults
    Set {
        #[command(flatten)]
        geometry: GeometryArgs,
    },
}

/// Run a geometry subcommand.
pub fn run(
    runner: &CliRunner,
    vessel: Option<&str>,
    command: GeometryCommands,
) -> Result<(), CliError> {
    let service = runner.service();
    let scope = runner.scope();

    match command {
        GeometryCommands::Show { project, json } => {
            let geometry = service.resolve_config(scope, vessel, project.as_deref())?;
            if json {
                return print_json(&geometry);
            }
            println!("vessel               = {}", geometry.vessel_tag.as_deref().unwrap_or("-"));
            println!(
                "active_project       = {}",
                geometry.active_project_number.as_deref().unwrap_or("-")
            );
            println!("num_cables           = {}", geometry.num_cables);
            println!("sections_per_cable   = {}", geometry.sections_per_cable);
            println!("tail_sections        = {}", geometry.tail_sections());
            println!("section_length       = {}", geometry.section_length);
            println!("module_frequency     = {}", geometry.module_frequency);
            println!("use_rope_for_tail    = {}", geometry.use_rope_for_tail);
            println!("channels_per_section = {}", geometry.channels_per_section);
        }
        GeometryCommands::Set { geometry } => {
            let overrides: GeometryOverrides = geometry.into();
            if overrides.is_empty() {
                return Err(CliError::Config("no geometry fields given".to_string()));
            }
            match service.update_config(scope, vessel, &overrides)? {
                ConfigTarget::Project(number) => println!("Updated geometry of project {}", number),
                ConfigTarget::Defaults => println!("Updated global geometry defaults"),
            }
        }
    }
    Ok(())
}
