//! Event filtering.

use chrono::NaiveDate;

use crate::model::CleaningEvent;

/// Filter for [`Store::list_events`](super::Store::list_events).
///
/// Date bounds are inclusive calendar days compared against the date part
/// of `cleaned_at`. Events whose timestamp has no parseable date never match
/// a date-bounded query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub project_number: Option<String>,
    pub vessel_tag: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl EventQuery {
    /// Query for a single project.
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

    pub fn matches(&self, event: &CleaningEvent) -> bool {
        if let Some(number) = &self.project_number {
            if event.project_number.as_deref() != Some(number.as_str()) {
                return false;
            }
        }
        if let Some(vessel) = &self.vessel_tag {
            if event.vessel_tag.as_deref() != Some(vessel.as_str()) {
                return false;
            }
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(day) = event.cleaned_on() else {
            return false;
        };
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}
