//! Serializable image of the whole store.

use semver::Version;
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult};
use crate::geometry::GeometryOverrides;
use crate::model::{CleaningEvent, Project, StreamerDeployment, VesselActiveProject};

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0.0";

/// The entire store: what the JSON file holds and what backups contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub format_version: String,
    pub next_project_id: u64,
    pub next_event_id: u64,
    #[serde(default)]
    pub defaults: GeometryOverrides,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub events: Vec<CleaningEvent>,
    #[serde(default)]
    pub pointers: Vec<VesselActiveProject>,
    #[serde(default)]
    pub deployments: Vec<StreamerDeployment>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION.to_string(),
            next_project_id: 1,
            next_event_id: 1,
            defaults: GeometryOverrides::default(),
            projects: Vec::new(),
            events: Vec::new(),
            pointers: Vec::new(),
            deployments: Vec::new(),
        }
    }
}

impl StoreSnapshot {
    /// Parse a snapshot, rejecting other major format versions.
    pub fn from_json(bytes: &[u8]) -> StoreResult<Self> {
        let snapshot: StoreSnapshot = serde_json::from_slice(bytes)?;
        snapshot.check_format()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn check_format(&self) -> StoreResult<()> {
        let incompatible = || StoreError::IncompatibleFormat {
            found: self.format_version.clone(),
            supported: SNAPSHOT_FORMAT_VERSION.to_string(),
        };
        let found = Version::parse(&self.format_version).map_err(|_| incompatible())?;
        let supported = Version::parse(SNAPSHOT_FORMAT_VERSION).map_err(|_| incompatible())?;
        if found.major != supported.major {
            return Err(incompatible());
        }
        Ok(())
    }
}
