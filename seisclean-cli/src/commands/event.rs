//! Cleaning event CLI commands.

use clap::Subcommand;
use console::style;
use seisclean::model::EventId;
use seisclean::service::{EventUpdate, LabeledEvent, RecordCleaning};

use super::common::{or_dash, print_json, FilterArgs, SectionTypeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Event subcommands.
#[derive(Debug, Subcommand)]
pub enum EventCommands {
    /// Record a cleaning
    ///
    /// Without --type, START and END are global section indices and a range
    /// crossing into the tail is stored as two events.
    Add {
        /// Streamer number (1-based)
        streamer: u32,
        /// First section
        start: u32,
        /// Last section
        end: u32,

        /// Index space of START and END
        #[arg(long = "type", value_enum)]
        section_type: Option<SectionTypeArg>,

        /// Cleaning method (e.g. rope, brush)
        #[arg(long)]
        method: String,

        /// ISO-8601 timestamp (defaults to now)
        #[arg(long)]
        at: Option<String>,

        /// Number of passes
        #[arg(long)]
        count: Option<u32>,

        /// Project number (defaults to the vessel's active project)
        #[arg(long)]
        project: Option<String>,
    },

    /// List cleaning events
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Edit a recorded event
    Update {
        /// Event id
        id: u64,
        #[arg(long)]
        streamer: Option<u32>,
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
        #[arg(long = "type", value_enum)]
        section_type: Option<SectionTypeArg>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        count: Option<u32>,
    },

    /// Delete one event
    Delete {
        /// Event id
        id: u64,
    },

    /// Delete all events of a project, or every event
    Purge {
        /// Only this project's events
        #[arg(long)]
        project: Option<String>,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Run an event subcommand.
pub fn run(
    runner: &CliRunner,
    vessel: Option<&str>,
    command: EventCommands,
) -> Result<(), CliError> {
    let service = runner.service();
    let scope = runner.scope();

    match command {
        EventCommands::Add {
            streamer,
            start,
            end,
            section_type,
            method,
            at,
            count,
            project,
        } => {
            let stored = service.record_cleaning(
                scope,
                RecordCleaning {
                    streamer_id: streamer,
                    section_index_start: start,
                    section_index_end: end,
                    section_type: section_type.map(Into::into),
                    cleaning_method: method,
                    cleaned_at: at,
                    cleaning_count: count,
                    project_number: project,
                    vessel_tag: vessel.map(String::from),
                },
            )?;
            for labeled in &stored {
                let e = &labeled.event;
                println!(
                    "Recorded event {}: streamer {} {} {}-{} ({})",
                    style(e.id).bold(),
                    e.streamer_id,
                    e.section_type,
                    e.section_index_start,
                    e.section_index_end,
                    labeled.eb_range
                );
            }
        }
        EventCommands::List { filter, json } => {
            let events = service.list_events(scope, &filter.to_filter(vessel))?;
            if json {
                return print_json(&events);
            }
            print_events(&events);
        }
        EventCommands::Update {
            id,
            streamer,
            start,
            end,
            section_type,
            method,
            at,
            count,
        } => {
            let updated = service.update_event(
                scope,
                EventId(id),
                EventUpdate {
                    streamer_id: streamer,
                    section_index_start: start,
                    section_index_end: end,
                    section_type: section_type.map(Into::into),
                    cleaning_method: method,
                    cleaned_at: at,
                    cleaning_count: count,
                },
            )?;
            println!("Updated event {} ({})", updated.event.id, updated.eb_range);
        }
        EventCommands::Delete { id } => {
            service.delete_event(scope, EventId(id))?;
            println!("Deleted event {}", id);
        }
        EventCommands::Purge { project, yes } => {
            if !yes {
                return Err(CliError::Config(
                    "purge deletes events permanently; re-run with --yes".to_string(),
                ));
            }
            let removed = match project.as_deref() {
                Some(number) => service.delete_project_events(scope, number)?,
                None => service.purge_events(scope)?,
            };
            println!("Deleted {} events", removed);
        }
    }
    Ok(())
}

fn print_events(events: &[LabeledEvent]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    println!(
        "{:>5}  {:<20} {:>3} {:<6} {:>9} {:<16} {:<8} {:>2} {}",
        "ID", "CLEANED AT", "STR", "TYPE", "SECTIONS", "EB", "METHOD", "N", "PROJECT"
    );
    for labeled in events {
        let e = &labeled.event;
        println!(
            "{:>5}  {:<20} {:>3} {:<6} {:>9} {:<16} {:<8} {:>2} {}",
            e.id.0,
            e.cleaned_at,
            e.streamer_id,
            e.section_type.as_str(),
            e.range().to_string(),
            labeled.eb_range,
            e.cleaning_method,
            e.cleaning_count,
            or_dash(e.project_number.as_deref())
        );
    }
}
