//! Vessel/project scope resolution.
//!
//! Each vessel has exactly one pointer row naming its active project (or
//! none). Activation is an upsert of that row, so activating a project for
//! one vessel can never disturb another vessel's active project, and there
//! is no way for two projects of the same vessel to be active at once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use seisclean::model::NewProject;
//! use seisclean::scope::{AccessScope, Role, ScopeResolver};
//! use seisclean::store::{JsonStore, Store};
//!
//! let store: Arc<dyn Store> = Arc::new(JsonStore::in_memory());
//! let project = store
//!     .insert_project(NewProject {
//!         project_number: "P-100".into(),
//!         vessel_tag: "ALPHA".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! let resolver = ScopeResolver::new(Arc::clone(&store));
//! let admin = AccessScope::for_vessel(Role::Admin, "ALPHA");
//! resolver.activate(&admin, project.id).unwrap();
//!
//! assert_eq!(resolver.resolve("ALPHA").unwrap().unwrap().id, project.id);
//! assert!(resolver.resolve("BRAVO").unwrap().is_none());
//! ```

mod access;

pub use access::{AccessScope, Role, VesselScope};

use std::sync::Arc;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::model::{Project, ProjectId, VesselActiveProject};
use crate::store::Store;

/// Resolves and changes which project is active per vessel.
#[derive(Clone)]
pub struct ScopeResolver {
    store: Arc<dyn Store>,
}

impl ScopeResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Make `project_id` the active project of its vessel.
    ///
    /// Replaces whatever was active for that vessel. Activating the project
    /// that is already active leaves the pointer row untouched.
    pub fn activate(
        &self,
        scope: &AccessScope,
        project_id: ProjectId,
    ) -> CoreResult<VesselActiveProject> {
        scope.ensure_role(Role::Admin, "activating a project")?;
        let project = self
            .store
            .get_project(project_id)?
            .ok_or_else(|| CoreError::not_found("project", project_id))?;
        ensure_owner(scope, &project)?;

        if let Some(current) = self.store.active_pointer(&project.vessel_tag)? {
            if current.active_project_id == Some(project_id) {
                return Ok(current);
            }
        }

        let pointer = self
            .store
            .upsert_active_pointer(&project.vessel_tag, Some(project_id))?;
        info!(
            vessel = %project.vessel_tag,
            project = %project.project_number,
            "Activated project"
        );
        Ok(pointer)
    }

    /// Clear the active project of a vessel.
    pub fn deactivate(&self, scope: &AccessScope, vessel_tag: &str) -> CoreResult<()> {
        scope.ensure_role(Role::Admin, "deactivating a project")?;
        scope.ensure_vessel(vessel_tag)?;
        self.store.upsert_active_pointer(vessel_tag, None)?;
        info!(vessel = %vessel_tag, "Deactivated project");
        Ok(())
    }

    /// The active project of a vessel, if any.
    ///
    /// A pointer to a project that no longer exists resolves to none.
    pub fn resolve(&self, vessel_tag: &str) -> CoreResult<Option<Project>> {
        let Some(pointer) = self.store.active_pointer(vessel_tag)? else {
            return Ok(None);
        };
        match pointer.active_project_id {
            Some(id) => Ok(self.store.get_project(id)?),
            None => Ok(None),
        }
    }
}

/// Fail unless the caller may mutate `project`.
pub fn ensure_owner(scope: &AccessScope, project: &Project) -> CoreResult<()> {
    scope.ensure_vessel(&project.vessel_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewProject;
    use crate::store::JsonStore;

    fn setup() -> (Arc<dyn Store>, ScopeResolver) {
        let store: Arc<dyn Store> = Arc::new(JsonStore::in_memory());
        let resolver = ScopeResolver::new(Arc::clone(&store));
        (store, resolver)
    }

    fn add_project(store: &Arc<dyn Store>, number: &str, vessel: &str) -> Project {
        store
            .insert_project(NewProject {
                project_number: number.to_string(),
                vessel_tag: vessel.to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    fn admin() -> AccessScope {
        AccessScope::unrestricted(Role::Admin)
    }

    #[test]
    fn test_activate_twice_is_idempotent() {
        let (store, resolver) = setup();
        let p = add_project(&store, "P-1", "ALPHA");

        let first = resolver.activate(&admin(), p.id).unwrap();
        let second = resolver.activate(&admin(), p.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.active_pointer("ALPHA").unwrap().unwrap(), first);
    }

    #[test]
    fn test_second_activation_replaces_first() {
        let (store, resolver) = setup();
        let p1 = add_project(&store, "P-1", "ALPHA");
        let p2 = add_project(&store, "P-2", "ALPHA");

        resolver.activate(&admin(), p1.id).unwrap();
        resolver.activate(&admin(), p2.id).unwrap();
        assert_eq!(resolver.resolve("ALPHA").unwrap().unwrap().id, p2.id);
    }

    #[test]
    fn test_activation_is_isolated_per_vessel() {
        let (store, resolver) = setup();
        let a = add_project(&store, "A-1", "ALPHA");
        let b = add_project(&store, "B-1", "BRAVO");

        resolver.activate(&admin(), b.id).unwrap();
        resolver.activate(&admin(), a.id).unwrap();

        assert_eq!(resolver.resolve("BRAVO").unwrap().unwrap().id, b.id);
        assert_eq!(resolver.resolve("ALPHA").unwrap().unwrap().id, a.id);
    }

    #[test]
    fn test_deactivate_clears_pointer() {
        let (store, resolver) = setup();
        let p = add_project(&store, "P-1", "ALPHA");
        resolver.activate(&admin(), p.id).unwrap();

        resolver.deactivate(&admin(), "ALPHA").unwrap();
        assert!(resolver.resolve("ALPHA").unwrap().is_none());
    }

    #[test]
    fn test_scoped_admin_cannot_activate_foreign_project() {
        let (store, resolver) = setup();
        let p = add_project(&store, "B-1", "BRAVO");

        let scoped = AccessScope::for_vessel(Role::Admin, "ALPHA");
        let err = resolver.activate(&scoped, p.id).unwrap_err();
        assert!(matches!(err, CoreError::ScopeViolation(_)));
        assert!(resolver.resolve("BRAVO").unwrap().is_none());
    }

    #[test]
    fn test_operator_cannot_activate() {
        let (store, resolver) = setup();
        let p = add_project(&store, "P-1", "ALPHA");
        let operator = AccessScope::unrestricted(Role::Operator);
        assert!(resolver.activate(&operator, p.id).is_err());
    }

    #[test]
    fn test_activate_missing_project() {
        let (_store, resolver) = setup();
        let err = resolver.activate(&admin(), ProjectId(99)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_pointer_to_deleted_project_resolves_to_none() {
        let (store, resolver) = setup();
        let p = add_project(&store, "P-1", "ALPHA");
        resolver.activate(&admin(), p.id).unwrap();
        store.delete_project(p.id).unwrap();
        assert!(resolver.resolve("ALPHA").unwrap().is_none());
    }
}
