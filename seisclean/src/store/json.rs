//! JSON snapshot file store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{EventQuery, Store, StoreError, StoreResult, StoreSnapshot};
use crate::geometry::GeometryOverrides;
use crate::model::{
    CleaningEvent, EventId, NewCleaningEvent, NewProject, Project, ProjectDeletion, ProjectId,
    StreamerDeployment, VesselActiveProject,
};

/// Store holding all records in memory and writing through to a JSON file.
///
/// Each mutation is applied to a copy of the state, written to
/// `<path>.tmp` and renamed over `<path>`; only then does the copy replace
/// the in-memory state. A failed write leaves both untouched.
pub struct JsonStore {
    path: Option<PathBuf>,
    state: RwLock<StoreSnapshot>,
}

impl std::fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreSnapshot::default()),
        }
    }

    /// Open the store file at `path`, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| StoreError::ReadFailed {
                path: path.clone(),
                source: e,
            })?;
            let snapshot = StoreSnapshot::from_json(&bytes)?;
            info!(
                path = %path.display(),
                projects = snapshot.projects.len(),
                events = snapshot.events.len(),
                "Opened store"
            );
            snapshot
        } else {
            info!(path = %path.display(), "Creating new store");
            StoreSnapshot::default()
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// Location of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreSnapshot) -> T) -> T {
        let guard = self.state.read();
        f(&*guard)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut StoreSnapshot) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn persist(&self, state: &StoreSnapshot) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let bytes = state.to_json()?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| StoreError::WriteFailed {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| StoreError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "Store persisted");
        Ok(())
    }
}

impl Store for JsonStore {
    fn list_events(&self, query: &EventQuery) -> StoreResult<Vec<CleaningEvent>> {
        let mut events: Vec<CleaningEvent> = self.read(|s| {
            s.events
                .iter()
                .filter(|e| query.matches(e))
                .cloned()
                .collect()
        });
        events.sort_by(|a, b| a.cleaned_at.cmp(&b.cleaned_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    fn get_event(&self, id: EventId) -> StoreResult<Option<CleaningEvent>> {
        Ok(self.read(|s| s.events.iter().find(|e| e.id == id).cloned()))
    }

    fn insert_events(&self, events: Vec<NewCleaningEvent>) -> StoreResult<Vec<CleaningEvent>> {
        self.mutate(|s| {
            let mut inserted = Vec::with_capacity(events.len());
            for event in events {
                let id = EventId(s.next_event_id);
                s.next_event_id += 1;
                let event = event.with_id(id);
                s.events.push(event.clone());
                inserted.push(event);
            }
            Ok(inserted)
        })
    }

    fn update_event(&self, event: CleaningEvent) -> StoreResult<bool> {
        let id = event.id;
        self.mutate(|s| match s.events.iter_mut().find(|e| e.id == id) {
            Some(slot) => {
                *slot = event;
                Ok(true)
            }
            None => Ok(false),
        })
    }

    fn delete_event(&self, id: EventId) -> StoreResult<bool> {
        self.mutate(|s| {
            let before = s.events.len();
            s.events.retain(|e| e.id != id);
            Ok(s.events.len() != before)
        })
    }

    fn delete_events_by_project(&self, project_number: &str) -> StoreResult<usize> {
        self.mutate(|s| Ok(remove_project_events(s, project_number)))
    }

    fn delete_all_events(&self) -> StoreResult<usize> {
        self.mutate(|s| {
            let removed = s.events.len();
            s.events.clear();
            Ok(removed)
        })
    }

    fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.read(|s| s.projects.iter().find(|p| p.id == id).cloned()))
    }

    fn find_project(&self, project_number: &str) -> StoreResult<Option<Project>> {
        Ok(self.read(|s| {
            s.projects
                .iter()
                .find(|p| p.project_number == project_number)
                .cloned()
        }))
    }

    fn list_projects(&self, vessel_tag: Option<&str>) -> StoreResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.read(|s| {
            s.projects
                .iter()
                .filter(|p| vessel_tag.map_or(true, |v| p.vessel_tag == v))
                .cloned()
                .collect()
        });
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        self.mutate(|s| {
            if s.projects
                .iter()
                .any(|p| p.project_number == project.project_number)
            {
                return Err(StoreError::Duplicate(format!(
                    "project number {}",
                    project.project_number
                )));
            }
            let created = Project {
                id: ProjectId(s.next_project_id),
                project_number: project.project_number,
                name: project.name,
                vessel_tag: project.vessel_tag,
                geometry: project.geometry,
                comments: project.comments,
                created_at: Utc::now(),
            };
            s.next_project_id += 1;
            s.projects.push(created.clone());
            Ok(created)
        })
    }

    fn update_project(&self, project: Project) -> StoreResult<bool> {
        self.mutate(|s| {
            if s.projects
                .iter()
                .any(|p| p.id != project.id && p.project_number == project.project_number)
            {
                return Err(StoreError::Duplicate(format!(
                    "project number {}",
                    project.project_number
                )));
            }
            let id = project.id;
            match s.projects.iter_mut().find(|p| p.id == id) {
                Some(slot) => {
                    *slot = project;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        self.mutate(|s| {
            let before = s.projects.len();
            s.projects.retain(|p| p.id != id);
            Ok(s.projects.len() != before)
        })
    }

    fn delete_project_cascade(&self, id: ProjectId) -> StoreResult<Option<ProjectDeletion>> {
        self.mutate(|s| {
            let Some(index) = s.projects.iter().position(|p| p.id == id) else {
                return Ok(None);
            };
            let project = s.projects.remove(index);
            Ok(Some(ProjectDeletion {
                events_removed: remove_project_events(s, &project.project_number),
                deployments_removed: remove_project_deployments(s, id),
                pointers_cleared: clear_project_pointers(s, id),
            }))
        })
    }

    fn count_events_for_project(&self, project_number: &str) -> StoreResult<usize> {
        Ok(self.read(|s| {
            s.events
                .iter()
                .filter(|e| e.project_number.as_deref() == Some(project_number))
                .count()
        }))
    }

    fn load_defaults(&self) -> StoreResult<GeometryOverrides> {
        Ok(self.read(|s| s.defaults.clone()))
    }

    fn save_defaults(&self, defaults: GeometryOverrides) -> StoreResult<()> {
        self.mutate(|s| {
            s.defaults = defaults;
            Ok(())
        })
    }

    fn active_pointer(&self, vessel_tag: &str) -> StoreResult<Option<VesselActiveProject>> {
        Ok(self.read(|s| {
            s.pointers
                .iter()
                .find(|p| p.vessel_tag == vessel_tag)
                .cloned()
        }))
    }

    fn upsert_active_pointer(
        &self,
        vessel_tag: &str,
        project: Option<ProjectId>,
    ) -> StoreResult<VesselActiveProject> {
        self.mutate(|s| {
            let row = VesselActiveProject {
                vessel_tag: vessel_tag.to_string(),
                active_project_id: project,
                updated_at: Utc::now(),
            };
            match s.pointers.iter_mut().find(|p| p.vessel_tag == vessel_tag) {
                Some(slot) => *slot = row.clone(),
                None => s.pointers.push(row.clone()),
            }
            Ok(row)
        })
    }

    fn clear_pointers_to(&self, project: ProjectId) -> StoreResult<usize> {
        self.mutate(|s| Ok(clear_project_pointers(s, project)))
    }

    fn list_deployments(&self, project: ProjectId) -> StoreResult<Vec<StreamerDeployment>> {
        let mut deployments: Vec<StreamerDeployment> = self.read(|s| {
            s.deployments
                .iter()
                .filter(|d| d.project_id == project)
                .cloned()
                .collect()
        });
        deployments.sort_by_key(|d| d.streamer_id);
        Ok(deployments)
    }

    fn upsert_deployment(&self, deployment: StreamerDeployment) -> StoreResult<()> {
        self.mutate(|s| {
            match s.deployments.iter_mut().find(|d| {
                d.project_id == deployment.project_id && d.streamer_id == deployment.streamer_id
            }) {
                Some(slot) => *slot = deployment,
                None => s.deployments.push(deployment),
            }
            Ok(())
        })
    }

    fn delete_deployments(&self, project: ProjectId) -> StoreResult<usize> {
        self.mutate(|s| Ok(remove_project_deployments(s, project)))
    }

    fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        Ok(self.read(|s| s.clone()))
    }
}

fn remove_project_events(s: &mut StoreSnapshot, project_number: &str) -> usize {
    let before = s.events.len();
    s.events
        .retain(|e| e.project_number.as_deref() != Some(project_number));
    before - s.events.len()
}

fn remove_project_deployments(s: &mut StoreSnapshot, project: ProjectId) -> usize {
    let before = s.deployments.len();
    s.deployments.retain(|d| d.project_id != project);
    before - s.deployments.len()
}

fn clear_project_pointers(s: &mut StoreSnapshot, project: ProjectId) -> usize {
    let now = Utc::now();
    let mut cleared = 0;
    for pointer in s
        .pointers
        .iter_mut()
        .filter(|p| p.active_project_id == Some(project))
    {
        pointer.active_project_id = None;
        pointer.updated_at = now;
        cleared += 1;
    }
    cleared
}
