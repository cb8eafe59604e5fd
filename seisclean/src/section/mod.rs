//! Section addressing model.
//!
//! Cleaning events address sections in one of two local index spaces:
//! active (`0..N`) and tail (`0..tail_sections`). Aggregation keys every
//! section by a single global index:
//!
//! ```text
//! global:  0 ........................ N-1 | N ..... N+tail-1
//! local:   active 0 ............ active N-1 | tail 0 .. tail-1
//! ```
//!
//! All functions here are pure and total over well-typed input.

mod types;

pub use types::{RangeValidation, SectionRange, SectionType, SplitRange};

use crate::geometry::StreamerGeometry;

/// Split a global range at the active/tail boundary.
///
/// `start` and `end` are swapped if reversed. The result holds up to two
/// ranges, each local to its own space. A range lying entirely past the
/// active sections of a rope-tail geometry yields an empty split.
pub fn split_range(start: u32, end: u32, geometry: &StreamerGeometry) -> SplitRange {
    let (start, end) = (start.min(end), start.max(end));
    let n = geometry.sections_per_cable;
    let tail_sections = geometry.tail_sections();

    if end < n {
        return SplitRange {
            active: Some(SectionRange::new(start, end)),
            tail: None,
        };
    }

    if start >= n {
        let tail_start = start - n;
        if tail_sections == 0 || tail_start >= tail_sections {
            return SplitRange::default();
        }
        let tail_end = (end - n).min(tail_sections - 1);
        return SplitRange {
            active: None,
            tail: Some(SectionRange::new(tail_start, tail_end)),
        };
    }

    // Straddles N
    let active = Some(SectionRange::new(start, n - 1));
    let tail = if tail_sections > 0 {
        let last = end.min(n.saturating_add(tail_sections - 1));
        Some(SectionRange::new(0, last - n))
    } else {
        None
    };
    SplitRange { active, tail }
}

/// Check that an already-relative range fits its declared space.
pub fn validate_range_for_type(
    start: u32,
    end: u32,
    section_type: SectionType,
    geometry: &StreamerGeometry,
) -> RangeValidation {
    if start > end {
        return RangeValidation::Invalid(format!(
            "start index {} is greater than end index {}",
            start, end
        ));
    }

    match section_type {
        SectionType::Active => {
            let n = geometry.sections_per_cable;
            if end >= n {
                return RangeValidation::Invalid(format!(
                    "active range {}-{} exceeds the {} active sections (valid 0-{})",
                    start,
                    end,
                    n,
                    n.saturating_sub(1)
                ));
            }
        }
        SectionType::Tail => {
            let tail_sections = geometry.tail_sections();
            if tail_sections == 0 {
                return RangeValidation::Invalid(
                    "tail sections are disabled for this configuration (rope tail)".to_string(),
                );
            }
            if end >= tail_sections {
                return RangeValidation::Invalid(format!(
                    "tail range {}-{} exceeds the {} tail sections (valid 0-{})",
                    start,
                    end,
                    tail_sections,
                    tail_sections - 1
                ));
            }
        }
    }

    RangeValidation::Valid
}

/// Map a local index to its global index.
#[inline]
pub fn global_index(section_type: SectionType, local: u32, geometry: &StreamerGeometry) -> u32 {
    match section_type {
        SectionType::Active => local,
        SectionType::Tail => geometry.sections_per_cable.saturating_add(local),
    }
}

/// Map a global index back to its space and local index.
///
/// Returns `None` for indices past the last tail section.
#[inline]
pub fn local_index(global: u32, geometry: &StreamerGeometry) -> Option<(SectionType, u32)> {
    let n = geometry.sections_per_cable;
    if global < n {
        Some((SectionType::Active, global))
    } else if global < geometry.total_sections() {
        Some((SectionType::Tail, global - n))
    } else {
        None
    }
}

/// Global indices covered by a typed local range.
pub fn global_indices(
    section_type: SectionType,
    range: SectionRange,
    geometry: &StreamerGeometry,
) -> impl Iterator<Item = u32> + '_ {
    range
        .indices()
        .map(move |local| global_index(section_type, local, geometry))
}
