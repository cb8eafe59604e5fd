//! Request and response values of the service facade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{CleaningEvent, Project};
use crate::section::SectionType;
use crate::store::EventQuery;

/// A cleaning to record.
///
/// With `section_type` set, the indices are local to that type and must fit
/// it. Without it, they are global indices and the range is split at the
/// active/tail boundary into one or two events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordCleaning {
    pub streamer_id: u32,
    pub section_index_start: u32,
    pub section_index_end: u32,
    #[serde(default)]
    pub section_type: Option<SectionType>,
    pub cleaning_method: String,
    /// ISO-8601 timestamp; now when absent.
    #[serde(default)]
    pub cleaned_at: Option<String>,
    #[serde(default)]
    pub cleaning_count: Option<u32>,
    /// Defaults to the vessel's active project.
    #[serde(default)]
    pub project_number: Option<String>,
    #[serde(default)]
    pub vessel_tag: Option<String>,
}

/// Partial edit of a recorded event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub streamer_id: Option<u32>,
    pub section_index_start: Option<u32>,
    pub section_index_end: Option<u32>,
    pub section_type: Option<SectionType>,
    pub cleaning_method: Option<String>,
    pub cleaned_at: Option<String>,
    pub cleaning_count: Option<u32>,
}

impl EventUpdate {
    pub(crate) fn apply(self, event: &mut CleaningEvent) {
        if let Some(v) = self.streamer_id {
            event.streamer_id = v;
        }
        if let Some(v) = self.section_index_start {
            event.section_index_start = v;
        }
        if let Some(v) = self.section_index_end {
            event.section_index_end = v;
        }
        if let Some(v) = self.section_type {
            event.section_type = v;
        }
        if let Some(v) = self.cleaning_method {
            event.cleaning_method = v;
        }
        if let Some(v) = self.cleaned_at {
            event.cleaned_at = v;
        }
        if let Some(v) = self.cleaning_count {
            event.cleaning_count = v;
        }
    }
}

/// Which events a read covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub project_number: Option<String>,
    pub vessel_tag: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EventFilter {
    pub fn for_project(project_number: impl Into<String>) -> Self {
        Self {
            project_number: Some(project_number.into()),
            ..Default::default()
        }
    }

    /// Restrict to a vessel (builder pattern).
    pub fn with_vessel(mut self, vessel_tag: impl Into<String>) -> Self {
        self.vessel_tag = Some(vessel_tag.into());
        self
    }

    /// Restrict to an inclusive date range (builder pattern).
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub(crate) fn to_query(&self, vessel_tag: Option<String>) -> EventQuery {
        EventQuery {
            project_number: self.project_number.clone(),
            vessel_tag,
            from: self.from,
            to: self.to,
        }
    }
}

/// An event with its equipment-box label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledEvent {
    #[serde(flatten)]
    pub event: CleaningEvent,
    pub eb_range: String,
}

/// A project and whether it is its vessel's active project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub is_active: bool,
}
