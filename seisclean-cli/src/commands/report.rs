//! Coverage, statistics and EB lookup commands.

use clap::Args;
use console::style;
use seisclean::coverage::{CoverageStats, FilteredStats, LastCleanedMap};
use seisclean::eb::eb_label;
use seisclean::StreamerGeometry;

use super::common::{print_json, FilterArgs, SectionTypeArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for `coverage` and `stats`.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `eb`.
#[derive(Debug, Clone, Args)]
pub struct EbArgs {
    /// First section
    pub start: u32,
    /// Last section
    pub end: u32,

    /// Index space of START and END
    #[arg(long = "type", value_enum, default_value = "active")]
    pub section_type: SectionTypeArg,

    /// Use this project's geometry
    #[arg(long)]
    pub project: Option<String>,
}

/// Per-streamer coverage map.
pub fn run_coverage(
    runner: &CliRunner,
    vessel: Option<&str>,
    args: ReportArgs,
) -> Result<(), CliError> {
    let filter = args.filter.to_filter(vessel);
    let (geometry, report) = runner.service().coverage(runner.scope(), &filter)?;
    if args.json {
        return print_json(&report);
    }

    print_geometry_line(&geometry);
    println!();
    print_coverage_map(&report.last_cleaned, &geometry);
    println!();
    print_stats(&report.stats);
    Ok(())
}

/// Totals, unique coverage and distance per method.
pub fn run_stats(runner: &CliRunner, vessel: Option<&str>, args: ReportArgs) -> Result<(), CliError> {
    let filter = args.filter.to_filter(vessel);
    let stats = runner.service().filtered_stats(runner.scope(), &filter)?;
    if args.json {
        return print_json(&stats);
    }
    print_filtered_stats(&stats);
    Ok(())
}

/// Equipment-box label for a range under the effective geometry.
pub fn run_eb(runner: &CliRunner, vessel: Option<&str>, args: EbArgs) -> Result<(), CliError> {
    let geometry =
        runner
            .service()
            .resolve_config(runner.scope(), vessel, args.project.as_deref())?;
    println!(
        "{}",
        eb_label(args.start, args.end, args.section_type.into(), &geometry)
    );
    Ok(())
}

fn print_geometry_line(geometry: &StreamerGeometry) {
    println!(
        "Vessel {} | project {} | {} streamers x {} sections + {} tail | {} m",
        geometry.vessel_tag.as_deref().unwrap_or("(all)"),
        geometry.active_project_number.as_deref().unwrap_or("(none)"),
        geometry.num_cables,
        geometry.sections_per_cable,
        geometry.tail_sections(),
        geometry.section_length
    );
}

/// One line per streamer: `#` cleaned, `.` never cleaned, `|` before the tail.
fn print_coverage_map(map: &LastCleanedMap, geometry: &StreamerGeometry) {
    let n = geometry.sections_per_cable as usize;
    for (streamer, slots) in map {
        let mut line = String::with_capacity(slots.len() + 1);
        for (index, slot) in slots.iter().enumerate() {
            if index == n {
                line.push('|');
            }
            line.push(if slot.is_some() { '#' } else { '.' });
        }
        let cleaned = slots.iter().filter(|s| s.is_some()).count();
        let latest = slots.iter().flatten().max().map(String::as_str).unwrap_or("-");
        println!(
            "S{:02} {} {:>3}/{:<3} latest {}",
            streamer,
            line,
            cleaned,
            slots.len(),
            latest
        );
    }
}

fn print_stats(stats: &CoverageStats) {
    println!("{}", style("Summary").bold());
    println!("  Events:            {}", stats.total_events);
    println!("  Sections cleaned:  {}", stats.total_sections);
    println!("  Distance cleaned:  {:.1} km", stats.total_distance / 1000.0);
    println!(
        "  Unique sections:   {} ({} active, {} tail)",
        stats.unique_cleaned_sections, stats.active_cleaned_sections, stats.tail_cleaned_sections
    );
}

fn print_filtered_stats(stats: &FilteredStats) {
    print_stats(&stats.stats);
    if stats.by_method.is_empty() {
        return;
    }
    println!();
    println!("{}", style("By method").bold());
    for (method, metres) in &stats.by_method {
        println!("  {:<12} {:.1} km", method, metres / 1000.0);
    }
}
