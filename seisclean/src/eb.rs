//! Equipment box (EB) labelling for active section ranges.
//!
//! Equipment boxes sit along the active part of a streamer: box #1 at
//! section 0, then one every `module_frequency` sections. Each box heads a
//! module of `module_frequency` sections:
//!
//! ```text
//! section:  0  1  2  3 | 4  5  6  7 | 8 ...        104 105 106 | tail
//! box:      EB01       | EB02       | EB03 ...     EB27        | Tail Adaptor
//! ```
//!
//! A cleaned range is labelled by the box at or before its start and the
//! first box whose module reaches its end, tail-ward number first.

use crate::geometry::StreamerGeometry;
use crate::section::SectionType;

/// Label returned for ranges in tail space.
pub const NOT_APPLICABLE: &str = "N/A";

/// Label returned when no box brackets the range.
pub const NO_BOX: &str = "-";

/// Name of the fitting past the last box.
pub const TAIL_ADAPTOR: &str = "Tail Adaptor";

/// An equipment box at an active-section position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentBox {
    /// 1-based box number.
    pub number: u32,
    /// Active section index the box sits at.
    pub position: u32,
}

impl EquipmentBox {
    /// Operational label, e.g. `EB07`.
    pub fn label(&self) -> String {
        format!("EB{:02}", self.number)
    }
}

/// Box layout for a cable of `sections_per_cable` active sections.
///
/// Sorted by position. The final box pinned to the last section is only
/// added when its number is not already taken.
pub fn equipment_boxes(sections_per_cable: u32, module_frequency: u32) -> Vec<EquipmentBox> {
    if sections_per_cable == 0 {
        return Vec::new();
    }
    let step = module_frequency.max(1);
    let last = sections_per_cable - 1;

    let mut boxes: Vec<EquipmentBox> = (0..sections_per_cable)
        .step_by(step as usize)
        .map(|position| EquipmentBox {
            number: position / step + 1,
            position,
        })
        .collect();

    let final_number = last / step + 1;
    if !boxes.iter().any(|b| b.number == final_number) {
        boxes.push(EquipmentBox {
            number: final_number,
            position: last,
        });
    }
    boxes
}

/// Resolve the EB label for an active range.
///
/// Bounds are normalized with min/max. `is_tail` short-circuits to
/// [`NOT_APPLICABLE`]: boxes only exist along active sections.
pub fn calculate_eb_range(
    start: u32,
    end: u32,
    sections_per_cable: u32,
    module_frequency: u32,
    is_tail: bool,
) -> String {
    if is_tail {
        return NOT_APPLICABLE.to_string();
    }

    let (start, end) = (start.min(end), start.max(end));
    let step = module_frequency.max(1);
    let boxes = equipment_boxes(sections_per_cable, step);

    let before = boxes.iter().rev().find(|b| b.position <= start);
    let after = boxes
        .iter()
        .find(|b| b.position.saturating_add(step - 1) >= end);

    match (before, after) {
        (Some(b), Some(a)) if b.number == a.number => b.label(),
        (Some(b), Some(a)) => {
            let (high, low) = if a.number > b.number { (a, b) } else { (b, a) };
            format!("{} - {}", high.label(), low.label())
        }
        (Some(b), None) => format!("{} - {}", TAIL_ADAPTOR, b.label()),
        (None, Some(a)) => a.label(),
        (None, None) => NO_BOX.to_string(),
    }
}

/// [`calculate_eb_range`] using a resolved geometry.
pub fn eb_label(
    start: u32,
    end: u32,
    section_type: SectionType,
    geometry: &StreamerGeometry,
) -> String {
    calculate_eb_range(
        start,
        end,
        geometry.sections_per_cable,
        geometry.module_frequency,
        section_type == SectionType::Tail,
    )
}
