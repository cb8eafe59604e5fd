//! Persistent records: projects, cleaning events, pointers, deployments.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::GeometryOverrides;
use crate::section::{SectionRange, SectionType};

/// Default `cleaning_count` for a recorded cleaning.
pub const DEFAULT_CLEANING_COUNT: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of work owned by one vessel, carrying its own geometry overrides.
///
/// Whether a project is active is not stored here; see
/// [`VesselActiveProject`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub project_number: String,
    pub name: Option<String>,
    pub vessel_tag: String,
    #[serde(default)]
    pub geometry: GeometryOverrides,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a project. The store assigns id and timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewProject {
    pub project_number: String,
    pub name: Option<String>,
    pub vessel_tag: String,
    pub geometry: GeometryOverrides,
    pub comments: Option<String>,
}

/// Partial update of a project. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub comments: Option<String>,
    pub geometry: GeometryOverrides,
}

/// Which project, if any, is active for a vessel. One row per vessel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselActiveProject {
    pub vessel_tag: String,
    pub active_project_id: Option<ProjectId>,
    pub updated_at: DateTime<Utc>,
}

/// A recorded mechanical cleaning of a contiguous run of sections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleaningEvent {
    pub id: EventId,
    pub streamer_id: u32,
    pub section_index_start: u32,
    pub section_index_end: u32,
    pub section_type: SectionType,
    pub cleaning_method: String,
    /// Sortable ISO-8601 timestamp.
    pub cleaned_at: String,
    #[serde(default = "default_cleaning_count")]
    pub cleaning_count: u32,
    /// Soft reference to [`Project::project_number`].
    pub project_number: Option<String>,
    pub vessel_tag: Option<String>,
}

fn default_cleaning_count() -> u32 {
    DEFAULT_CLEANING_COUNT
}

impl CleaningEvent {
    /// Local range covered by the event.
    pub fn range(&self) -> SectionRange {
        SectionRange::new(self.section_index_start, self.section_index_end)
    }

    /// Number of sections covered, counting each once.
    pub fn section_count(&self) -> u32 {
        self.range().len()
    }

    /// Calendar date of the cleaning, if `cleaned_at` starts with one.
    pub fn cleaned_on(&self) -> Option<NaiveDate> {
        timestamp_date(&self.cleaned_at)
    }
}

/// Calendar date at the start of an ISO-8601 timestamp.
pub fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    timestamp
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Canonical form of a cleaning timestamp: RFC 3339 in UTC, whole seconds,
/// `Z` suffix.
///
/// Accepts RFC 3339 with any offset, a naive `YYYY-MM-DDTHH:MM:SS` (read as
/// UTC) or a bare `YYYY-MM-DD` (midnight UTC). Stored timestamps are
/// compared as strings, so everything written goes through here.
pub fn normalize_timestamp(input: &str) -> Option<String> {
    let input = input.trim();
    let utc = if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        parsed.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        naive.and_utc()
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc()
    } else {
        return None;
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Fields for a new cleaning event, already split and validated.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCleaningEvent {
    pub streamer_id: u32,
    pub section_index_start: u32,
    pub section_index_end: u32,
    pub section_type: SectionType,
    pub cleaning_method: String,
    pub cleaned_at: String,
    pub cleaning_count: u32,
    pub project_number: Option<String>,
    pub vessel_tag: Option<String>,
}

impl NewCleaningEvent {
    /// Attach a store-assigned id.
    pub fn with_id(self, id: EventId) -> CleaningEvent {
        CleaningEvent {
            id,
            streamer_id: self.streamer_id,
            section_index_start: self.section_index_start,
            section_index_end: self.section_index_end,
            section_type: self.section_type,
            cleaning_method: self.cleaning_method,
            cleaned_at: self.cleaned_at,
            cleaning_count: self.cleaning_count,
            project_number: self.project_number,
            vessel_tag: self.vessel_tag,
        }
    }
}

/// Deployment facts for one streamer within one project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerDeployment {
    pub project_id: ProjectId,
    pub streamer_id: u32,
    pub deployment_date: Option<NaiveDate>,
    pub is_coated: Option<bool>,
}

/// What a project deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDeletion {
    pub events_removed: usize,
    pub deployments_removed: usize,
    pub pointers_cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(cleaned_at: &str) -> CleaningEvent {
        CleaningEvent {
            id: EventId(1),
            streamer_id: 1,
            section_index_start: 3,
            section_index_end: 9,
            section_type: SectionType::Active,
            cleaning_method: "rope".to_string(),
            cleaned_at: cleaned_at.to_string(),
            cleaning_count: 1,
            project_number: None,
            vessel_tag: None,
        }
    }

    #[test]
    fn test_event_section_count() {
        assert_eq!(event("2024-05-01T10:00:00Z").section_count(), 7);
    }

    #[test]
    fn test_cleaned_on_parses_date_prefix() {
        let e = event("2024-05-01T10:00:00Z");
        assert_eq!(e.cleaned_on(), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(event("garbage").cleaned_on(), None);
    }

    #[test]
    fn test_normalize_timestamp_converts_to_utc() {
        assert_eq!(
            normalize_timestamp("2024-03-02T01:00:00+05:00").as_deref(),
            Some("2024-03-01T20:00:00Z")
        );
        assert_eq!(
            normalize_timestamp(" 2024-03-01T22:00:00.750Z ").as_deref(),
            Some("2024-03-01T22:00:00Z")
        );
        assert_eq!(
            normalize_timestamp("2024-03-01T08:30:00").as_deref(),
            Some("2024-03-01T08:30:00Z")
        );
        assert_eq!(
            normalize_timestamp("2024-03-01").as_deref(),
            Some("2024-03-01T00:00:00Z")
        );
    }

    #[test]
    fn test_normalize_timestamp_rejects_junk() {
        assert_eq!(normalize_timestamp("2024-03-01 not a time"), None);
        assert_eq!(normalize_timestamp("2024-02-30"), None);
        assert_eq!(normalize_timestamp(""), None);
    }

    #[test]
    fn test_event_deserializes_default_count() {
        let json = r#"{
            "id": 4, "streamer_id": 2, "section_index_start": 0,
            "section_index_end": 1, "section_type": "tail",
            "cleaning_method": "brush", "cleaned_at": "2024-01-01",
            "project_number": null, "vessel_tag": "ALPHA"
        }"#;
        let e: CleaningEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.cleaning_count, 1);
        assert_eq!(e.section_type, SectionType::Tail);
        assert_eq!(e.id, EventId(4));
    }
}
