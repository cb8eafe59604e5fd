//! Common types and utilities shared across CLI commands.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use seisclean::section::SectionType;
use seisclean::service::EventFilter;
use seisclean::{GeometryOverrides, Role};

use crate::error::CliError;

/// Caller role for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RoleArg {
    /// Read-only
    Viewer,
    /// Record cleanings and deployments
    Operator,
    /// Manage projects, configuration and bulk deletes
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Viewer => Role::Viewer,
            RoleArg::Operator => Role::Operator,
            RoleArg::Admin => Role::Admin,
        }
    }
}

/// Section index space for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SectionTypeArg {
    /// Main streamer body
    Active,
    /// Tail sections (only without a rope tail)
    Tail,
}

impl From<SectionTypeArg> for SectionType {
    fn from(section_type: SectionTypeArg) -> Self {
        match section_type {
            SectionTypeArg::Active => SectionType::Active,
            SectionTypeArg::Tail => SectionType::Tail,
        }
    }
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", s, e))
}

/// Filters shared by reporting commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Restrict to a project number
    #[arg(long)]
    pub project: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self, vessel: Option<&str>) -> EventFilter {
        EventFilter {
            project_number: self.project.clone(),
            vessel_tag: vessel.map(String::from),
            from: self.from,
            to: self.to,
        }
    }
}

/// Geometry fields settable from the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct GeometryArgs {
    /// Number of streamers
    #[arg(long)]
    pub num_cables: Option<u32>,

    /// Active sections per streamer
    #[arg(long)]
    pub sections_per_cable: Option<u32>,

    /// Section length in metres
    #[arg(long)]
    pub section_length: Option<f64>,

    /// Sections between equipment boxes
    #[arg(long)]
    pub module_frequency: Option<u32>,

    /// Rope tail (true) or cleanable tail sections (false)
    #[arg(long)]
    pub rope_tail: Option<bool>,

    /// Channels per section
    #[arg(long)]
    pub channels_per_section: Option<u32>,
}

impl From<GeometryArgs> for GeometryOverrides {
    fn from(args: GeometryArgs) -> Self {
        GeometryOverrides {
            num_cables: args.num_cables,
            sections_per_cable: args.sections_per_cable,
            section_length: args.section_length,
            module_frequency: args.module_frequency,
            use_rope_for_tail: args.rope_tail,
            channels_per_section: args.channels_per_section,
        }
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Placeholder for an absent optional value.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_geometry_args_conversion() {
        let args = GeometryArgs {
            sections_per_cable: Some(90),
            rope_tail: Some(false),
            ..Default::default()
        };
        let overrides: GeometryOverrides = args.into();
        assert_eq!(overrides.sections_per_cable, Some(90));
        assert_eq!(overrides.use_rope_for_tail, Some(false));
        assert!(overrides.num_cables.is_none());
    }

    #[test]
    fn test_filter_args_carry_vessel() {
        let args = FilterArgs {
            project: Some("P-1".to_string()),
            ..Default::default()
        };
        let filter = args.to_filter(Some("ALPHA"));
        assert_eq!(filter.project_number.as_deref(), Some("P-1"));
        assert_eq!(filter.vessel_tag.as_deref(), Some("ALPHA"));
    }
}
