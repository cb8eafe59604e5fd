//! Persistent store for projects, events, pointers and deployments.
//!
//! The [`Store`] trait is the collaborator interface the core consumes. It is
//! deliberately record-oriented: filtering by project/vessel/date happens
//! here, while all addressing and aggregation logic stays in the pure
//! modules.
//!
//! [`JsonStore`] is the bundled implementation: state lives in memory behind
//! a lock and every mutation is written through to a JSON snapshot file
//! (temp file + rename). Concurrent writers are serialized by the lock; the
//! last write wins.
//!
//! # Example
//!
//! ```
//! use seisclean::store::{EventQuery, JsonStore, Store};
//!
//! let store = JsonStore::in_memory();
//! let events = store.list_events(&EventQuery::default()).unwrap();
//! assert!(events.is_empty());
//! ```

mod json;
mod query;
mod snapshot;

pub use json::JsonStore;
pub use query::EventQuery;
pub use snapshot::{StoreSnapshot, SNAPSHOT_FORMAT_VERSION};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::GeometryOverrides;
use crate::model::{
    CleaningEvent, EventId, NewCleaningEvent, NewProject, Project, ProjectDeletion, ProjectId,
    StreamerDeployment, VesselActiveProject,
};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the snapshot file.
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write the snapshot file.
    #[error("failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Snapshot could not be (de)serialized.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Snapshot was written by an incompatible version.
    #[error("unsupported snapshot format {found} (supported: {supported})")]
    IncompatibleFormat { found: String, supported: String },

    /// A unique key is already taken.
    #[error("duplicate key: {0}")]
    Duplicate(String),
}

/// Record store consumed by the core.
///
/// Implementations must be safe to share across threads. Every method is a
/// short read or a single write; none block indefinitely.
pub trait Store: Send + Sync {
    // ---- cleaning events ----

    /// Events matching the query, ordered by `cleaned_at` ascending.
    fn list_events(&self, query: &EventQuery) -> StoreResult<Vec<CleaningEvent>>;

    fn get_event(&self, id: EventId) -> StoreResult<Option<CleaningEvent>>;

    /// Insert a batch of events in one write. Returns them with ids.
    fn insert_events(&self, events: Vec<NewCleaningEvent>) -> StoreResult<Vec<CleaningEvent>>;

    /// Replace an event by id. Returns `false` if it does not exist.
    fn update_event(&self, event: CleaningEvent) -> StoreResult<bool>;

    fn delete_event(&self, id: EventId) -> StoreResult<bool>;

    /// Delete every event of a project. Returns the number removed.
    fn delete_events_by_project(&self, project_number: &str) -> StoreResult<usize>;

    /// Delete every event. Returns the number removed.
    fn delete_all_events(&self) -> StoreResult<usize>;

    // ---- projects ----

    fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>>;

    fn find_project(&self, project_number: &str) -> StoreResult<Option<Project>>;

    /// All projects, optionally restricted to one vessel, ordered by id.
    fn list_projects(&self, vessel_tag: Option<&str>) -> StoreResult<Vec<Project>>;

    /// Insert a project. Fails with [`StoreError::Duplicate`] if the
    /// project number is taken.
    fn insert_project(&self, project: NewProject) -> StoreResult<Project>;

    /// Replace a project by id. Returns `false` if it does not exist.
    fn update_project(&self, project: Project) -> StoreResult<bool>;

    fn delete_project(&self, id: ProjectId) -> StoreResult<bool>;

    /// Delete a project with its events and deployments and clear pointers
    /// naming it, all in one write. Returns `None` if it does not exist;
    /// on error nothing is removed.
    fn delete_project_cascade(&self, id: ProjectId) -> StoreResult<Option<ProjectDeletion>>;

    /// Number of events referencing a project number.
    fn count_events_for_project(&self, project_number: &str) -> StoreResult<usize>;

    // ---- global defaults ----

    fn load_defaults(&self) -> StoreResult<GeometryOverrides>;

    fn save_defaults(&self, defaults: GeometryOverrides) -> StoreResult<()>;

    // ---- active project pointers ----

    fn active_pointer(&self, vessel_tag: &str) -> StoreResult<Option<VesselActiveProject>>;

    /// Insert or replace the pointer row for a vessel.
    fn upsert_active_pointer(
        &self,
        vessel_tag: &str,
        project: Option<ProjectId>,
    ) -> StoreResult<VesselActiveProject>;

    /// Clear every pointer naming the project. Returns the number cleared.
    fn clear_pointers_to(&self, project: ProjectId) -> StoreResult<usize>;

    // ---- deployments ----

    fn list_deployments(&self, project: ProjectId) -> StoreResult<Vec<StreamerDeployment>>;

    /// Insert or replace by `(project_id, streamer_id)`.
    fn upsert_deployment(&self, deployment: StreamerDeployment) -> StoreResult<()>;

    fn delete_deployments(&self, project: ProjectId) -> StoreResult<usize>;

    // ---- whole store ----

    /// Consistent copy of the entire store, for backups.
    fn snapshot(&self) -> StoreResult<StoreSnapshot>;
}
