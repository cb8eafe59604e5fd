//! Coverage aggregation over cleaning events.
//!
//! This module provides pure functions that fold a filtered set of
//! [`CleaningEvent`]s and an effective [`StreamerGeometry`] into:
//!
//! - a last-cleaned map: per streamer, the most recent `cleaned_at` for every
//!   global section index
//! - unique coverage: distinct `(streamer, global index)` pairs, split into
//!   active and tail
//! - raw effort totals: sections and distance, double counting allowed
//! - covered distance per cleaning method
//!
//! Everything comes out of one pass over the events sorted newest first.
//! Under that order the first timestamp written to a slot is the most
//! recent one, so slots are only ever filled, never overwritten.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::geometry::StreamerGeometry;
use crate::model::CleaningEvent;
use crate::section::global_indices;

/// Per streamer id, one slot per global section index.
pub type LastCleanedMap = BTreeMap<u32, Vec<Option<String>>>;

/// Summary statistics for a set of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageStats {
    pub total_events: usize,
    /// Sum of section counts over all events.
    pub total_sections: u64,
    /// `total_sections` times the section length, in metres.
    pub total_distance: f64,
    /// Distinct `(streamer, global index)` pairs.
    pub unique_cleaned_sections: usize,
    pub active_cleaned_sections: usize,
    pub tail_cleaned_sections: usize,
}

/// Statistics plus covered distance per cleaning method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredStats {
    #[serde(flatten)]
    pub stats: CoverageStats,
    pub by_method: BTreeMap<String, f64>,
}

/// Everything derived from one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageReport {
    pub last_cleaned: LastCleanedMap,
    pub stats: CoverageStats,
    pub by_method: BTreeMap<String, f64>,
}

impl CoverageReport {
    /// Aggregate events under a geometry.
    ///
    /// Events may arrive in any order; they are sorted descending by
    /// `cleaned_at` before the pass.
    pub fn compute(events: &[CleaningEvent], geometry: &StreamerGeometry) -> Self {
        let total_slots = geometry.total_sections() as usize;
        let mut last_cleaned: LastCleanedMap = (1..=geometry.num_cables)
            .map(|streamer| (streamer, vec![None; total_slots]))
            .collect();

        let mut newest_first: Vec<&CleaningEvent> = events.iter().collect();
        newest_first.sort_by(|a, b| b.cleaned_at.cmp(&a.cleaned_at));

        let mut touched: HashSet<(u32, u32)> = HashSet::new();
        let mut total_sections: u64 = 0;
        let mut by_method: BTreeMap<String, f64> = BTreeMap::new();

        for event in newest_first {
            let range = event.range();
            let sections = range.len();
            total_sections += u64::from(sections);
            *by_method.entry(event.cleaning_method.clone()).or_insert(0.0) +=
                f64::from(sections) * geometry.section_length;

            let mut row = last_cleaned.get_mut(&event.streamer_id);
            for global in global_indices(event.section_type, range, geometry) {
                touched.insert((event.streamer_id, global));

                let slot = row
                    .as_mut()
                    .and_then(|slots| slots.get_mut(global as usize));
                if let Some(slot) = slot {
                    if slot.is_none() {
                        *slot = Some(event.cleaned_at.clone());
                    }
                }
            }
        }

        let n = geometry.sections_per_cable;
        let active_cleaned_sections = touched.iter().filter(|(_, g)| *g < n).count();
        let unique_cleaned_sections = touched.len();

        let stats = CoverageStats {
            total_events: events.len(),
            total_sections,
            total_distance: total_sections as f64 * geometry.section_length,
            unique_cleaned_sections,
            active_cleaned_sections,
            tail_cleaned_sections: unique_cleaned_sections - active_cleaned_sections,
        };

        Self {
            last_cleaned,
            stats,
            by_method,
        }
    }

    pub fn into_filtered_stats(self) -> FilteredStats {
        FilteredStats {
            stats: self.stats,
            by_method: self.by_method,
        }
    }
}

/// Most recent cleaning timestamp per streamer and global section.
pub fn compute_last_cleaned(
    events: &[CleaningEvent],
    geometry: &StreamerGeometry,
) -> LastCleanedMap {
    CoverageReport::compute(events, geometry).last_cleaned
}

/// Totals and unique coverage.
pub fn compute_stats(events: &[CleaningEvent], geometry: &StreamerGeometry) -> CoverageStats {
    CoverageReport::compute(events, geometry).stats
}

/// Totals, unique coverage and covered distance per method.
pub fn compute_filtered_stats(
    events: &[CleaningEvent],
    geometry: &StreamerGeometry,
) -> FilteredStats {
    CoverageReport::compute(events, geometry).into_filtered_stats()
}
