//! Section addressing types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which index space a section range is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// Main body of the streamer, `0..N`.
    Active,
    /// Tail sections, `0..tail_sections`.
    Tail,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Active => "active",
            SectionType::Tail => "tail",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SectionType::Active),
            "tail" => Ok(SectionType::Tail),
            other => Err(format!("unknown section type '{}'", other)),
        }
    }
}

/// An inclusive range of section indices local to one index space.
///
/// `start <= end` always holds for ranges built with [`SectionRange::new`],
/// so a range covers at least one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionRange {
    pub start: u32,
    pub end: u32,
}

impl SectionRange {
    /// Range between two bounds given in either order.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Number of sections covered.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// Always false: the range is inclusive and ordered.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the indices in the range.
    pub fn indices(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for SectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Result of splitting a global range at the active/tail boundary.
///
/// Both parts empty means the request fell entirely into tail space that
/// this geometry does not have. That is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitRange {
    /// Part in active space.
    pub active: Option<SectionRange>,
    /// Part in tail space, already shifted by `-N`.
    pub tail: Option<SectionRange>,
}

impl SplitRange {
    /// True when neither part has capacity.
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.tail.is_none()
    }

    /// The non-empty parts, active first.
    pub fn parts(&self) -> impl Iterator<Item = (SectionType, SectionRange)> {
        let active = self.active.map(|r| (SectionType::Active, r));
        let tail = self.tail.map(|r| (SectionType::Tail, r));
        active.into_iter().chain(tail)
    }
}

/// Outcome of checking an explicitly typed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeValidation {
    Valid,
    Invalid(String),
}

impl RangeValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, RangeValidation::Valid)
    }

    /// Reason the range was rejected, if it was.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RangeValidation::Valid => None,
            RangeValidation::Invalid(reason) => Some(reason),
        }
    }
}
