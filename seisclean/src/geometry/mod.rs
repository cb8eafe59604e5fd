//! Streamer geometry and its resolution.
//!
//! A vessel's rig is described by a [`StreamerGeometry`]: how many cables it
//! tows, how many active sections each cable has, and whether the tail is a
//! rope (no tail sections) or a run of [`TAIL_SECTION_COUNT`] cleanable
//! sections.
//!
//! The effective geometry is layered field by field:
//!
//! ```text
//! explicit project ─┐
//!                   ├─► project overrides ─► stored defaults ─► built-in defaults
//! active project  ──┘
//! ```
//!
//! See [`ConfigResolver`] for the resolution and write rules.

mod resolver;

pub use resolver::{ConfigResolver, ConfigTarget};

use serde::{Deserialize, Serialize};

/// Number of tail sections when the tail is not a rope.
pub const TAIL_SECTION_COUNT: u32 = 5;

/// Built-in number of cables.
pub const DEFAULT_NUM_CABLES: u32 = 12;

/// Built-in active sections per cable.
pub const DEFAULT_SECTIONS_PER_CABLE: u32 = 107;

/// Built-in section length in metres.
pub const DEFAULT_SECTION_LENGTH: f64 = 75.0;

/// Built-in spacing between equipment boxes, in sections.
pub const DEFAULT_MODULE_FREQUENCY: u32 = 4;

/// Built-in rope-tail mode.
pub const DEFAULT_USE_ROPE_FOR_TAIL: bool = true;

/// Built-in channels per section.
pub const DEFAULT_CHANNELS_PER_SECTION: u32 = 6;

/// Largest accepted number of cables.
pub const MAX_NUM_CABLES: u32 = 1_000;

/// Largest accepted number of active sections per cable.
pub const MAX_SECTIONS_PER_CABLE: u32 = 10_000;

/// Effective streamer configuration for a vessel/project context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamerGeometry {
    pub num_cables: u32,
    pub sections_per_cable: u32,
    /// Metres per section.
    pub section_length: f64,
    pub module_frequency: u32,
    /// A rope tail has no cleanable tail sections.
    pub use_rope_for_tail: bool,
    pub channels_per_section: u32,
    pub vessel_tag: Option<String>,
    pub active_project_number: Option<String>,
}

impl Default for StreamerGeometry {
    fn default() -> Self {
        Self {
            num_cables: DEFAULT_NUM_CABLES,
            sections_per_cable: DEFAULT_SECTIONS_PER_CABLE,
            section_length: DEFAULT_SECTION_LENGTH,
            module_frequency: DEFAULT_MODULE_FREQUENCY,
            use_rope_for_tail: DEFAULT_USE_ROPE_FOR_TAIL,
            channels_per_section: DEFAULT_CHANNELS_PER_SECTION,
            vessel_tag: None,
            active_project_number: None,
        }
    }
}

impl StreamerGeometry {
    /// Geometry with the given cable layout and built-in values elsewhere.
    pub fn new(num_cables: u32, sections_per_cable: u32, use_rope_for_tail: bool) -> Self {
        Self {
            num_cables,
            sections_per_cable,
            use_rope_for_tail,
            ..Default::default()
        }
    }

    /// Set the module frequency (builder pattern).
    pub fn with_module_frequency(mut self, module_frequency: u32) -> Self {
        self.module_frequency = module_frequency;
        self
    }

    /// Set the section length (builder pattern).
    pub fn with_section_length(mut self, section_length: f64) -> Self {
        self.section_length = section_length;
        self
    }

    /// Number of cleanable tail sections (0 with a rope tail).
    pub fn tail_sections(&self) -> u32 {
        if self.use_rope_for_tail {
            0
        } else {
            TAIL_SECTION_COUNT
        }
    }

    /// Active plus tail sections: the length of a per-streamer coverage row.
    pub fn total_sections(&self) -> u32 {
        self.sections_per_cable.saturating_add(self.tail_sections())
    }

    /// Whether the geometry has any tail sections.
    pub fn has_tail(&self) -> bool {
        self.tail_sections() > 0
    }

    /// Whether a streamer id belongs to this rig.
    pub fn contains_streamer(&self, streamer_id: u32) -> bool {
        (1..=self.num_cables).contains(&streamer_id)
    }

    /// Apply overrides on top of this geometry, field by field.
    pub fn layered(mut self, overrides: &GeometryOverrides) -> Self {
        if let Some(v) = overrides.num_cables {
            self.num_cables = v;
        }
        if let Some(v) = overrides.sections_per_cable {
            self.sections_per_cable = v;
        }
        if let Some(v) = overrides.section_length {
            self.section_length = v;
        }
        if let Some(v) = overrides.module_frequency {
            self.module_frequency = v;
        }
        if let Some(v) = overrides.use_rope_for_tail {
            self.use_rope_for_tail = v;
        }
        if let Some(v) = overrides.channels_per_section {
            self.channels_per_section = v;
        }
        self
    }
}

/// Optional value for every geometry field.
///
/// Stored per project and as the global defaults row. Absent fields fall
/// through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_cables: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections_per_cable: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_rope_for_tail: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels_per_section: Option<u32>,
}

impl GeometryOverrides {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == GeometryOverrides::default()
    }

    /// Copy every field present in `update` onto `self`.
    pub fn merge(&mut self, update: &GeometryOverrides) {
        if update.num_cables.is_some() {
            self.num_cables = update.num_cables;
        }
        if update.sections_per_cable.is_some() {
            self.sections_per_cable = update.sections_per_cable;
        }
        if update.section_length.is_some() {
            self.section_length = update.section_length;
        }
        if update.module_frequency.is_some() {
            self.module_frequency = update.module_frequency;
        }
        if update.use_rope_for_tail.is_some() {
            self.use_rope_for_tail = update.use_rope_for_tail;
        }
        if update.channels_per_section.is_some() {
            self.channels_per_section = update.channels_per_section;
        }
    }

    /// Check that every present field is in range.
    ///
    /// Returns the reason for the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let counts = [
            ("num_cables", self.num_cables),
            ("sections_per_cable", self.sections_per_cable),
            ("module_frequency", self.module_frequency),
        ];
        for (name, value) in counts {
            if value == Some(0) {
                return Err(format!("{} must be at least 1", name));
            }
        }
        let limits = [
            ("num_cables", self.num_cables, MAX_NUM_CABLES),
            ("sections_per_cable", self.sections_per_cable, MAX_SECTIONS_PER_CABLE),
            ("module_frequency", self.module_frequency, MAX_SECTIONS_PER_CABLE),
        ];
        for (name, value, max) in limits {
            if let Some(value) = value.filter(|v| *v > max) {
                return Err(format!("{} must be at most {}, got {}", name, max, value));
            }
        }
        if let Some(length) = self.section_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(format!("section_length must be positive, got {}", length));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_matches_builtins() {
        let geometry = StreamerGeometry::default();
        assert_eq!(geometry.num_cables, 12);
        assert_eq!(geometry.sections_per_cable, 107);
        assert_eq!(geometry.section_length, 75.0);
        assert_eq!(geometry.module_frequency, 4);
        assert!(geometry.use_rope_for_tail);
        assert_eq!(geometry.channels_per_section, 6);
    }

    #[test]
    fn test_tail_sections_follow_rope_mode() {
        let rope = StreamerGeometry::new(12, 107, true);
        assert_eq!(rope.tail_sections(), 0);
        assert_eq!(rope.total_sections(), 107);

        let tail = StreamerGeometry::new(12, 107, false);
        assert_eq!(tail.tail_sections(), 5);
        assert_eq!(tail.total_sections(), 112);
    }

    #[test]
    fn test_layered_applies_only_present_fields() {
        let overrides = GeometryOverrides {
            num_cables: Some(8),
            use_rope_for_tail: Some(false),
            ..Default::default()
        };
        let geometry = StreamerGeometry::default().layered(&overrides);
        assert_eq!(geometry.num_cables, 8);
        assert!(!geometry.use_rope_for_tail);
        assert_eq!(geometry.sections_per_cable, 107);
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut stored = GeometryOverrides {
            num_cables: Some(10),
            section_length: Some(12.5),
            ..Default::default()
        };
        stored.merge(&GeometryOverrides {
            section_length: Some(100.0),
            ..Default::default()
        });
        assert_eq!(stored.num_cables, Some(10));
        assert_eq!(stored.section_length, Some(100.0));
    }

    #[test]
    fn test_validate_rejects_zero_and_negative() {
        let zero = GeometryOverrides {
            module_frequency: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().unwrap_err().contains("module_frequency"));

        let negative = GeometryOverrides {
            section_length: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        assert!(GeometryOverrides::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_counts() {
        let huge = GeometryOverrides {
            sections_per_cable: Some(u32::MAX),
            use_rope_for_tail: Some(false),
            ..Default::default()
        };
        let reason = huge.validate().unwrap_err();
        assert!(reason.contains("sections_per_cable must be at most 10000"));

        let rig = GeometryOverrides {
            num_cables: Some(1_000_000),
            sections_per_cable: Some(100_000),
            ..Default::default()
        };
        assert!(rig.validate().unwrap_err().starts_with("num_cables"));

        let at_limit = GeometryOverrides {
            num_cables: Some(MAX_NUM_CABLES),
            sections_per_cable: Some(MAX_SECTIONS_PER_CABLE),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_total_sections_saturates() {
        let geometry = StreamerGeometry::new(1, u32::MAX, false);
        assert_eq!(geometry.total_sections(), u32::MAX);
    }

    #[test]
    fn test_contains_streamer() {
        let geometry = StreamerGeometry::new(3, 10, true);
        assert!(!geometry.contains_streamer(0));
        assert!(geometry.contains_streamer(1));
        assert!(geometry.contains_streamer(3));
        assert!(!geometry.contains_streamer(4));
    }
}
