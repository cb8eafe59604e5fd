//! Request-level operations.
//!
//! [`CleaningService`] wires the resolvers, the addressing model, the EB
//! resolver and the coverage aggregator to a [`Store`]. Every read follows
//! the same path:
//!
//! ```text
//!   AccessScope + EventFilter
//!        │
//!        ├─► ConfigResolver ──► StreamerGeometry
//!        │
//!        └─► Store::list_events ──► Vec<CleaningEvent>
//!                                        │
//!                                        ▼
//!                              coverage / eb (pure)
//! ```
//!
//! Store failures are logged here and surfaced as [`CoreError::Store`].

mod requests;

pub use crate::model::ProjectDeletion;
pub use requests::{EventFilter, EventUpdate, LabeledEvent, ProjectView, RecordCleaning};

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::coverage::{CoverageReport, CoverageStats, FilteredStats, LastCleanedMap};
use crate::eb::eb_label;
use crate::error::{CoreError, CoreResult};
use crate::geometry::{ConfigResolver, ConfigTarget, GeometryOverrides, StreamerGeometry};
use crate::model::{
    normalize_timestamp, CleaningEvent, EventId, NewCleaningEvent, NewProject, Project, ProjectId,
    ProjectUpdate, StreamerDeployment, DEFAULT_CLEANING_COUNT,
};
use crate::scope::{self, AccessScope, Role, ScopeResolver};
use crate::section::{split_range, validate_range_for_type, SectionRange, SectionType};
use crate::store::Store;

/// Log store failures at the request boundary.
fn boundary<T>(operation: &'static str, f: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
    let result = f();
    if let Err(CoreError::Store(e)) = &result {
        error!(operation, error = %e, "Store failure");
    }
    result
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Facade over the store for every user-facing operation.
#[derive(Clone)]
pub struct CleaningService {
    store: Arc<dyn Store>,
    scopes: ScopeResolver,
    config: ConfigResolver,
}

impl CleaningService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            scopes: ScopeResolver::new(Arc::clone(&store)),
            config: ConfigResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cleaning events
    // ─────────────────────────────────────────────────────────────────────

    /// Validate and store a cleaning. Returns the stored event(s).
    ///
    /// An untyped range is split at the active/tail boundary; a range with
    /// nothing cleanable in it is rejected.
    pub fn record_cleaning(
        &self,
        scope: &AccessScope,
        request: RecordCleaning,
    ) -> CoreResult<Vec<LabeledEvent>> {
        boundary("record_cleaning", || {
            scope.ensure_role(Role::Operator, "recording a cleaning")?;

            let (project, vessel) = self.event_context(
                scope,
                request.project_number.as_deref(),
                request.vessel_tag.as_deref(),
            )?;
            let geometry = self.config.resolve_config(
                scope,
                vessel.as_deref(),
                project.as_ref().map(|p| p.project_number.as_str()),
            )?;

            check_streamer(request.streamer_id, &geometry)?;
            let method = request.cleaning_method.trim();
            if method.is_empty() {
                return Err(CoreError::validation("cleaning method is required"));
            }
            let cleaning_count = request.cleaning_count.unwrap_or(DEFAULT_CLEANING_COUNT);
            if cleaning_count == 0 {
                return Err(CoreError::validation("cleaning count must be at least 1"));
            }
            let cleaned_at = match request.cleaned_at {
                Some(ts) => check_timestamp(ts)?,
                None => now_timestamp(),
            };

            let start = request.section_index_start;
            let end = request.section_index_end;
            let parts: Vec<(SectionType, SectionRange)> = match request.section_type {
                Some(section_type) => {
                    let validation = validate_range_for_type(start, end, section_type, &geometry);
                    if let Some(reason) = validation.reason() {
                        return Err(CoreError::validation(reason));
                    }
                    vec![(section_type, SectionRange::new(start, end))]
                }
                None => {
                    let split = split_range(start, end, &geometry);
                    if split.is_empty() {
                        return Err(CoreError::validation("range has no cleanable sections"));
                    }
                    split.parts().collect()
                }
            };

            let project_number = project.map(|p| p.project_number);
            let new_events = parts
                .into_iter()
                .map(|(section_type, range)| NewCleaningEvent {
                    streamer_id: request.streamer_id,
                    section_index_start: range.start,
                    section_index_end: range.end,
                    section_type,
                    cleaning_method: method.to_string(),
                    cleaned_at: cleaned_at.clone(),
                    cleaning_count,
                    project_number: project_number.clone(),
                    vessel_tag: vessel.clone(),
                })
                .collect();

            let stored = self.store.insert_events(new_events)?;
            info!(
                streamer = request.streamer_id,
                events = stored.len(),
                project = ?project_number,
                vessel = ?vessel,
                "Recorded cleaning"
            );
            Ok(label_events(stored, &geometry))
        })
    }

    /// Edit a recorded event. The result must be a valid typed range.
    pub fn update_event(
        &self,
        scope: &AccessScope,
        id: EventId,
        update: EventUpdate,
    ) -> CoreResult<LabeledEvent> {
        boundary("update_event", || {
            scope.ensure_role(Role::Operator, "updating an event")?;
            let mut event = self.owned_event(scope, id)?;
            update.apply(&mut event);

            let geometry = self.event_geometry(scope, &event)?;
            check_streamer(event.streamer_id, &geometry)?;
            if event.cleaning_method.trim().is_empty() {
                return Err(CoreError::validation("cleaning method is required"));
            }
            if event.cleaning_count == 0 {
                return Err(CoreError::validation("cleaning count must be at least 1"));
            }
            event.cleaned_at = check_timestamp(event.cleaned_at)?;
            let validation = validate_range_for_type(
                event.section_index_start,
                event.section_index_end,
                event.section_type,
                &geometry,
            );
            if let Some(reason) = validation.reason() {
                return Err(CoreError::validation(reason));
            }

            if !self.store.update_event(event.clone())? {
                return Err(CoreError::not_found("event", id));
            }
            info!(event = %id, "Updated event");
            Ok(label_event(event, &geometry))
        })
    }

    pub fn delete_event(&self, scope: &AccessScope, id: EventId) -> CoreResult<()> {
        boundary("delete_event", || {
            scope.ensure_role(Role::Operator, "deleting an event")?;
            self.owned_event(scope, id)?;
            if !self.store.delete_event(id)? {
                return Err(CoreError::not_found("event", id));
            }
            info!(event = %id, "Deleted event");
            Ok(())
        })
    }

    /// Delete every event of a project. Returns the number removed.
    pub fn delete_project_events(
        &self,
        scope: &AccessScope,
        project_number: &str,
    ) -> CoreResult<usize> {
        boundary("delete_project_events", || {
            scope.ensure_role(Role::Admin, "deleting project events")?;
            let project = self.project_by_number(project_number)?;
            scope::ensure_owner(scope, &project)?;
            let removed = self.store.delete_events_by_project(project_number)?;
            warn!(project = %project_number, removed, "Deleted project events");
            Ok(removed)
        })
    }

    /// Delete every event in the store. Returns the number removed.
    pub fn purge_events(&self, scope: &AccessScope) -> CoreResult<usize> {
        boundary("purge_events", || {
            scope.ensure_privileged("purging all events")?;
            let removed = self.store.delete_all_events()?;
            warn!(removed, "Purged all events");
            Ok(removed)
        })
    }

    /// Events matching the filter, oldest first, with EB labels.
    pub fn list_events(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
    ) -> CoreResult<Vec<LabeledEvent>> {
        boundary("list_events", || {
            let (geometry, events) = self.fetch(scope, filter)?;
            Ok(label_events(events, &geometry))
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Coverage
    // ─────────────────────────────────────────────────────────────────────

    /// Geometry, last-cleaned map, stats and per-method distance in one pass.
    pub fn coverage(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
    ) -> CoreResult<(StreamerGeometry, CoverageReport)> {
        boundary("coverage", || {
            let (geometry, events) = self.fetch(scope, filter)?;
            let report = CoverageReport::compute(&events, &geometry);
            Ok((geometry, report))
        })
    }

    pub fn last_cleaned(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
    ) -> CoreResult<LastCleanedMap> {
        Ok(self.coverage(scope, filter)?.1.last_cleaned)
    }

    pub fn stats(&self, scope: &AccessScope, filter: &EventFilter) -> CoreResult<CoverageStats> {
        Ok(self.coverage(scope, filter)?.1.stats)
    }

    pub fn filtered_stats(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
    ) -> CoreResult<FilteredStats> {
        Ok(self.coverage(scope, filter)?.1.into_filtered_stats())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_project(&self, scope: &AccessScope, mut new: NewProject) -> CoreResult<Project> {
        boundary("create_project", || {
            scope.ensure_role(Role::Admin, "creating a project")?;
            new.project_number = new.project_number.trim().to_string();
            new.vessel_tag = new.vessel_tag.trim().to_string();
            if new.vessel_tag.is_empty() {
                if let Some(own) = scope.vessel_tag() {
                    new.vessel_tag = own.to_string();
                }
            }
            if new.project_number.is_empty() {
                return Err(CoreError::validation("project number is required"));
            }
            if new.vessel_tag.is_empty() {
                return Err(CoreError::validation("vessel tag is required"));
            }
            scope.ensure_vessel(&new.vessel_tag)?;
            new.geometry.validate().map_err(CoreError::validation)?;
            if self.store.find_project(&new.project_number)?.is_some() {
                return Err(CoreError::validation(format!(
                    "project number {} already exists",
                    new.project_number
                )));
            }

            let project = self.store.insert_project(new)?;
            info!(
                project = %project.project_number,
                vessel = %project.vessel_tag,
                "Created project"
            );
            Ok(project)
        })
    }

    pub fn update_project(
        &self,
        scope: &AccessScope,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> CoreResult<Project> {
        boundary("update_project", || {
            scope.ensure_role(Role::Admin, "updating a project")?;
            let mut project = self.project_by_id(id)?;
            scope::ensure_owner(scope, &project)?;
            update.geometry.validate().map_err(CoreError::validation)?;

            if let Some(name) = update.name {
                project.name = Some(name);
            }
            if let Some(comments) = update.comments {
                project.comments = Some(comments);
            }
            project.geometry.merge(&update.geometry);

            if !self.store.update_project(project.clone())? {
                return Err(CoreError::not_found("project", id));
            }
            info!(project = %project.project_number, "Updated project");
            Ok(project)
        })
    }

    /// Delete a project.
    ///
    /// Without `cascade` the project must have no events or deployments.
    /// With it, those are removed and any pointer naming it is cleared.
    pub fn delete_project(
        &self,
        scope: &AccessScope,
        id: ProjectId,
        cascade: bool,
    ) -> CoreResult<ProjectDeletion> {
        boundary("delete_project", || {
            scope.ensure_role(Role::Admin, "deleting a project")?;
            let project = self.project_by_id(id)?;
            scope::ensure_owner(scope, &project)?;

            if !cascade {
                let events = self.store.count_events_for_project(&project.project_number)?;
                let deployments = self.store.list_deployments(id)?.len();
                if events > 0 || deployments > 0 {
                    return Err(CoreError::validation(format!(
                        "project {} has {} events and {} deployments; delete with cascade",
                        project.project_number, events, deployments
                    )));
                }
            }

            let deletion = self
                .store
                .delete_project_cascade(id)?
                .ok_or_else(|| CoreError::not_found("project", id))?;
            warn!(
                project = %project.project_number,
                events = deletion.events_removed,
                deployments = deletion.deployments_removed,
                "Deleted project"
            );
            Ok(deletion)
        })
    }

    /// Projects visible to the caller, flagged with their activity.
    pub fn list_projects(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
    ) -> CoreResult<Vec<ProjectView>> {
        boundary("list_projects", || {
            let vessel = scope.effective_vessel(vessel)?;
            let projects = self.store.list_projects(vessel.as_deref())?;
            let mut views = Vec::with_capacity(projects.len());
            for project in projects {
                let is_active = self
                    .store
                    .active_pointer(&project.vessel_tag)?
                    .and_then(|p| p.active_project_id)
                    == Some(project.id);
                views.push(ProjectView { project, is_active });
            }
            Ok(views)
        })
    }

    pub fn activate_project(&self, scope: &AccessScope, id: ProjectId) -> CoreResult<Project> {
        boundary("activate_project", || {
            self.scopes.activate(scope, id)?;
            self.project_by_id(id)
        })
    }

    pub fn deactivate_project(&self, scope: &AccessScope, vessel: Option<&str>) -> CoreResult<()> {
        boundary("deactivate_project", || {
            let vessel = self.required_vessel(scope, vessel)?;
            self.scopes.deactivate(scope, &vessel)
        })
    }

    pub fn active_project(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
    ) -> CoreResult<Option<Project>> {
        boundary("active_project", || {
            let vessel = self.required_vessel(scope, vessel)?;
            self.scopes.resolve(&vessel)
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Deployments
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_deployment(
        &self,
        scope: &AccessScope,
        deployment: StreamerDeployment,
    ) -> CoreResult<StreamerDeployment> {
        boundary("set_deployment", || {
            scope.ensure_role(Role::Operator, "setting a deployment")?;
            let project = self.project_by_id(deployment.project_id)?;
            scope::ensure_owner(scope, &project)?;
            let geometry =
                self.config
                    .resolve_config(scope, None, Some(&project.project_number))?;
            check_streamer(deployment.streamer_id, &geometry)?;

            self.store.upsert_deployment(deployment.clone())?;
            info!(
                project = %project.project_number,
                streamer = deployment.streamer_id,
                "Set deployment"
            );
            Ok(deployment)
        })
    }

    pub fn list_deployments(
        &self,
        scope: &AccessScope,
        project_id: ProjectId,
    ) -> CoreResult<Vec<StreamerDeployment>> {
        boundary("list_deployments", || {
            let project = self.project_by_id(project_id)?;
            scope.ensure_vessel(&project.vessel_tag)?;
            Ok(self.store.list_deployments(project_id)?)
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────

    pub fn resolve_config(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
        project_number: Option<&str>,
    ) -> CoreResult<StreamerGeometry> {
        boundary("resolve_config", || {
            self.config.resolve_config(scope, vessel, project_number)
        })
    }

    pub fn update_config(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
        update: &GeometryOverrides,
    ) -> CoreResult<ConfigTarget> {
        boundary("update_config", || {
            self.config.update_config(scope, vessel, update)
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────

    fn project_by_id(&self, id: ProjectId) -> CoreResult<Project> {
        self.store
            .get_project(id)?
            .ok_or_else(|| CoreError::not_found("project", id))
    }

    fn project_by_number(&self, project_number: &str) -> CoreResult<Project> {
        self.store
            .find_project(project_number)?
            .ok_or_else(|| CoreError::not_found("project", project_number))
    }

    fn required_vessel(&self, scope: &AccessScope, vessel: Option<&str>) -> CoreResult<String> {
        scope
            .effective_vessel(vessel)?
            .ok_or_else(|| CoreError::validation("a vessel is required"))
    }

    /// Project and vessel a new event belongs to.
    ///
    /// An explicit project fixes the vessel; otherwise the vessel's active
    /// project, if any, is used.
    fn event_context(
        &self,
        scope: &AccessScope,
        project_number: Option<&str>,
        vessel: Option<&str>,
    ) -> CoreResult<(Option<Project>, Option<String>)> {
        let vessel = scope.effective_vessel(vessel)?;
        match project_number {
            Some(number) => {
                let project = self.project_by_number(number)?;
                scope.ensure_vessel(&project.vessel_tag)?;
                if let Some(requested) = &vessel {
                    if *requested != project.vessel_tag {
                        return Err(CoreError::validation(format!(
                            "project {} belongs to vessel {}, not {}",
                            project.project_number, project.vessel_tag, requested
                        )));
                    }
                }
                let vessel = Some(project.vessel_tag.clone());
                Ok((Some(project), vessel))
            }
            None => {
                let project = match vessel.as_deref() {
                    Some(tag) => self.scopes.resolve(tag)?,
                    None => None,
                };
                Ok((project, vessel))
            }
        }
    }

    /// Fetch an event the caller may modify.
    fn owned_event(&self, scope: &AccessScope, id: EventId) -> CoreResult<CleaningEvent> {
        let event = self
            .store
            .get_event(id)?
            .ok_or_else(|| CoreError::not_found("event", id))?;
        match &event.vessel_tag {
            Some(tag) => scope.ensure_vessel(tag)?,
            None if !scope.is_unrestricted() => {
                return Err(CoreError::scope(format!(
                    "event {} has no vessel and can only be changed by an unrestricted caller",
                    id
                )))
            }
            None => {}
        }
        Ok(event)
    }

    /// Geometry an existing event is interpreted under.
    fn event_geometry(
        &self,
        scope: &AccessScope,
        event: &CleaningEvent,
    ) -> CoreResult<StreamerGeometry> {
        let project = match event.project_number.as_deref() {
            Some(number) => self.store.find_project(number)?,
            None => None,
        };
        self.config.resolve_config(
            scope,
            event.vessel_tag.as_deref(),
            project.as_ref().map(|p| p.project_number.as_str()),
        )
    }

    /// Resolve the request geometry and fetch the matching events.
    fn fetch(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
    ) -> CoreResult<(StreamerGeometry, Vec<CleaningEvent>)> {
        let vessel = scope.effective_vessel(filter.vessel_tag.as_deref())?;
        let geometry = self.config.resolve_config(
            scope,
            vessel.as_deref(),
            filter.project_number.as_deref(),
        )?;
        let events = self.store.list_events(&filter.to_query(vessel))?;
        Ok((geometry, events))
    }
}

fn check_streamer(streamer_id: u32, geometry: &StreamerGeometry) -> CoreResult<()> {
    if geometry.contains_streamer(streamer_id) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "streamer {} is outside 1..={}",
            streamer_id, geometry.num_cables
        )))
    }
}

fn check_timestamp(timestamp: String) -> CoreResult<String> {
    normalize_timestamp(&timestamp).ok_or_else(|| {
        CoreError::validation(format!(
            "cleaned_at '{}' is not an ISO-8601 timestamp",
            timestamp.trim()
        ))
    })
}

fn label_event(event: CleaningEvent, geometry: &StreamerGeometry) -> LabeledEvent {
    let eb_range = eb_label(
        event.section_index_start,
        event.section_index_end,
        event.section_type,
        geometry,
    );
    LabeledEvent { event, eb_range }
}

fn label_events(events: Vec<CleaningEvent>, geometry: &StreamerGeometry) -> Vec<LabeledEvent> {
    events
        .into_iter()
        .map(|event| label_event(event, geometry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use chrono::NaiveDate;

    fn admin() -> AccessScope {
        AccessScope::unrestricted(Role::Admin)
    }

    fn operator(vessel: &str) -> AccessScope {
        AccessScope::for_vessel(Role::Operator, vessel)
    }

    /// Service with an active tail-enabled project P-1 on ALPHA.
    fn setup() -> (CleaningService, Project) {
        let service = CleaningService::new(Arc::new(JsonStore::in_memory()));
        let project = service
            .create_project(
                &admin(),
                NewProject {
                    project_number: "P-1".to_string(),
                    vessel_tag: "ALPHA".to_string(),
                    geometry: GeometryOverrides {
                        use_rope_for_tail: Some(false),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();
        service.activate_project(&admin(), project.id).unwrap();
        (service, project)
    }

    fn cleaning(streamer: u32, start: u32, end: u32, at: &str) -> RecordCleaning {
        RecordCleaning {
            streamer_id: streamer,
            section_index_start: start,
            section_index_end: end,
            cleaning_method: "rope".to_string(),
            cleaned_at: Some(at.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_untyped_range_is_split_at_tail() {
        let (service, _) = setup();
        let stored = service
            .record_cleaning(&operator("ALPHA"), cleaning(1, 105, 108, "2024-03-01T08:00:00Z"))
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].event.section_type, SectionType::Active);
        assert_eq!(stored[0].event.range(), SectionRange::new(105, 106));
        assert_eq!(stored[1].event.section_type, SectionType::Tail);
        assert_eq!(stored[1].event.range(), SectionRange::new(0, 1));
        assert_eq!(stored[1].eb_range, crate::eb::NOT_APPLICABLE);
        assert!(stored
            .iter()
            .all(|e| e.event.project_number.as_deref() == Some("P-1")));
    }

    #[test]
    fn test_range_beyond_rope_tail_is_rejected() {
        let service = CleaningService::new(Arc::new(JsonStore::in_memory()));
        let err = service
            .record_cleaning(&admin(), cleaning(1, 107, 110, "2024-03-01"))
            .unwrap_err();
        match err {
            CoreError::Validation(reason) => assert_eq!(reason, "range has no cleanable sections"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_typed_range_must_fit_its_type() {
        let (service, _) = setup();
        let request = RecordCleaning {
            section_type: Some(SectionType::Tail),
            ..cleaning(1, 0, 5, "2024-03-01")
        };
        let err = service.record_cleaning(&operator("ALPHA"), request).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_record_validates_inputs() {
        let (service, _) = setup();
        let scope = operator("ALPHA");

        let err = service
            .record_cleaning(&scope, cleaning(13, 0, 1, "2024-03-01"))
            .unwrap_err();
        assert!(err.to_string().contains("streamer 13"));

        let err = service
            .record_cleaning(&scope, cleaning(1, 0, 1, "last tuesday"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let request = RecordCleaning {
            cleaning_count: Some(0),
            ..cleaning(1, 0, 1, "2024-03-01")
        };
        assert!(service.record_cleaning(&scope, request).is_err());
    }

    #[test]
    fn test_record_requires_operator_in_own_vessel() {
        let (service, _) = setup();
        let viewer = AccessScope::for_vessel(Role::Viewer, "ALPHA");
        let err = service
            .record_cleaning(&viewer, cleaning(1, 0, 1, "2024-03-01"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ScopeViolation(_)));

        let request = RecordCleaning {
            project_number: Some("P-1".to_string()),
            ..cleaning(1, 0, 1, "2024-03-01")
        };
        let err = service.record_cleaning(&operator("BRAVO"), request).unwrap_err();
        assert!(matches!(err, CoreError::ScopeViolation(_)));
    }

    #[test]
    fn test_stats_through_service() {
        let (service, _) = setup();
        let scope = operator("ALPHA");
        service
            .record_cleaning(&scope, cleaning(1, 0, 3, "2024-03-01T08:00:00Z"))
            .unwrap();
        let tail = RecordCleaning {
            section_type: Some(SectionType::Tail),
            ..cleaning(1, 0, 1, "2024-03-02T08:00:00Z")
        };
        service.record_cleaning(&scope, tail).unwrap();

        let filter = EventFilter::for_project("P-1");
        let stats = service.stats(&scope, &filter).unwrap();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.unique_cleaned_sections, 6);
        assert_eq!(stats.active_cleaned_sections, 4);
        assert_eq!(stats.tail_cleaned_sections, 2);

        let map = service.last_cleaned(&scope, &filter).unwrap();
        let row = &map[&1];
        assert_eq!(row.len(), 112);
        assert_eq!(row[108].as_deref(), Some("2024-03-02T08:00:00Z"));
        assert!(row[4].is_none());

        let filtered = service.filtered_stats(&scope, &filter).unwrap();
        assert_eq!(filtered.by_method["rope"], 6.0 * 75.0);
    }

    #[test]
    fn test_mixed_offsets_keep_newest_first() {
        let (service, _) = setup();
        let scope = operator("ALPHA");
        let earlier = service
            .record_cleaning(&scope, cleaning(1, 0, 0, "2024-03-02T01:00:00+05:00"))
            .unwrap();
        assert_eq!(earlier[0].event.cleaned_at, "2024-03-01T20:00:00Z");
        service
            .record_cleaning(&scope, cleaning(1, 0, 0, "2024-03-01T22:00:00Z"))
            .unwrap();

        let map = service
            .last_cleaned(&scope, &EventFilter::for_project("P-1"))
            .unwrap();
        assert_eq!(map[&1][0].as_deref(), Some("2024-03-01T22:00:00Z"));

        let err = service
            .record_cleaning(&scope, cleaning(1, 0, 0, "2024-03-01 not a time"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let updated = service
            .update_event(
                &scope,
                earlier[0].event.id,
                EventUpdate {
                    cleaned_at: Some("2024-03-02T06:30:00+02:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.event.cleaned_at, "2024-03-02T04:30:00Z");
    }

    #[test]
    fn test_list_events_filters_by_date_and_labels() {
        let (service, _) = setup();
        let scope = operator("ALPHA");
        service
            .record_cleaning(&scope, cleaning(2, 3, 5, "2024-01-10T00:00:00Z"))
            .unwrap();
        service
            .record_cleaning(&scope, cleaning(2, 0, 0, "2024-02-10T00:00:00Z"))
            .unwrap();

        let january = EventFilter::default().with_dates(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );
        let events = service.list_events(&scope, &january).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].eb_range, "EB02 - EB01");
    }

    #[test]
    fn test_restricted_reader_sees_only_own_vessel() {
        let (service, _) = setup();
        let bravo = service
            .create_project(
                &admin(),
                NewProject {
                    project_number: "B-1".to_string(),
                    vessel_tag: "BRAVO".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        service.activate_project(&admin(), bravo.id).unwrap();
        service
            .record_cleaning(&operator("ALPHA"), cleaning(1, 0, 0, "2024-01-01"))
            .unwrap();
        service
            .record_cleaning(&operator("BRAVO"), cleaning(1, 0, 0, "2024-01-01"))
            .unwrap();

        let viewer = AccessScope::for_vessel(Role::Viewer, "BRAVO");
        let events = service.list_events(&viewer, &EventFilter::default()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.vessel_tag.as_deref(), Some("BRAVO"));

        let projects = service.list_projects(&viewer, None).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].is_active);

        let err = service
            .list_events(&viewer, &EventFilter::default().with_vessel("ALPHA"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ScopeViolation(_)));
    }

    #[test]
    fn test_update_event_revalidates() {
        let (service, _) = setup();
        let scope = operator("ALPHA");
        let stored = service
            .record_cleaning(&scope, cleaning(1, 0, 3, "2024-03-01"))
            .unwrap();
        let id = stored[0].event.id;

        let updated = service
            .update_event(
                &scope,
                id,
                EventUpdate {
                    section_index_end: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.event.section_index_end, 7);
        assert_eq!(updated.eb_range, "EB02 - EB01");

        let err = service
            .update_event(
                &scope,
                id,
                EventUpdate {
                    section_index_end: Some(200),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_delete_event_checks_vessel() {
        let (service, _) = setup();
        let stored = service
            .record_cleaning(&operator("ALPHA"), cleaning(1, 0, 3, "2024-03-01"))
            .unwrap();
        let id = stored[0].event.id;

        assert!(service.delete_event(&operator("BRAVO"), id).is_err());
        service.delete_event(&operator("ALPHA"), id).unwrap();
        let err = service.delete_event(&operator("ALPHA"), id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_delete_project_requires_cascade_when_used() {
        let (service, project) = setup();
        service
            .record_cleaning(&operator("ALPHA"), cleaning(1, 0, 3, "2024-03-01"))
            .unwrap();

        let err = service.delete_project(&admin(), project.id, false).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let deletion = service.delete_project(&admin(), project.id, true).unwrap();
        assert_eq!(deletion.events_removed, 1);
        assert_eq!(deletion.pointers_cleared, 1);
        assert!(service
            .active_project(&admin(), Some("ALPHA"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_project_wide_deletes_need_admin() {
        let (service, _) = setup();
        service
            .record_cleaning(&operator("ALPHA"), cleaning(1, 0, 3, "2024-03-01"))
            .unwrap();

        assert!(service.delete_project_events(&operator("ALPHA"), "P-1").is_err());
        let scoped_admin = AccessScope::for_vessel(Role::Admin, "ALPHA");
        assert!(service.purge_events(&scoped_admin).is_err());

        assert_eq!(service.delete_project_events(&scoped_admin, "P-1").unwrap(), 1);
        assert_eq!(service.purge_events(&admin()).unwrap(), 0);
    }

    #[test]
    fn test_create_project_validation() {
        let (service, _) = setup();
        let err = service
            .create_project(
                &admin(),
                NewProject {
                    project_number: "P-1".to_string(),
                    vessel_tag: "ALPHA".to_string(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let scoped = AccessScope::for_vessel(Role::Admin, "BRAVO");
        let created = service
            .create_project(
                &scoped,
                NewProject {
                    project_number: "B-7".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(created.vessel_tag, "BRAVO");
    }

    #[test]
    fn test_update_project_merges_geometry() {
        let (service, project) = setup();
        let updated = service
            .update_project(
                &admin(),
                project.id,
                ProjectUpdate {
                    name: Some("North Sea 3D".to_string()),
                    geometry: GeometryOverrides {
                        num_cables: Some(10),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("North Sea 3D"));
        assert_eq!(updated.geometry.num_cables, Some(10));
        assert_eq!(updated.geometry.use_rope_for_tail, Some(false));

        let geometry = service.resolve_config(&admin(), Some("ALPHA"), None).unwrap();
        assert_eq!(geometry.num_cables, 10);
    }

    #[test]
    fn test_deployments() {
        let (service, project) = setup();
        let scope = operator("ALPHA");
        let deployment = StreamerDeployment {
            project_id: project.id,
            streamer_id: 3,
            deployment_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            is_coated: Some(true),
        };
        service.set_deployment(&scope, deployment.clone()).unwrap();
        service
            .set_deployment(
                &scope,
                StreamerDeployment {
                    is_coated: Some(false),
                    ..deployment.clone()
                },
            )
            .unwrap();

        let listed = service.list_deployments(&scope, project.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].is_coated, Some(false));

        let err = service
            .set_deployment(
                &scope,
                StreamerDeployment {
                    streamer_id: 40,
                    ..deployment
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_deactivate_requires_vessel_for_unrestricted_caller() {
        let (service, _) = setup();
        let err = service.deactivate_project(&admin(), None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        service.deactivate_project(&admin(), Some("ALPHA")).unwrap();
    }
}
