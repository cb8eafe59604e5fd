//! Effective geometry for a vessel/project context.
//!
//! Layers, lowest first:
//!
//! ```text
//!   built-in constants
//!        ↑ stored global defaults
//!             ↑ project overrides (explicit project, else vessel's active one)
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use super::{GeometryOverrides, StreamerGeometry};
use crate::error::{CoreError, CoreResult};
use crate::model::Project;
use crate::scope::{self, AccessScope, Role, ScopeResolver};
use crate::store::Store;

/// Where an [`ConfigResolver::update_config`] write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigTarget {
    /// The vessel's active project, by project number.
    Project(String),
    /// The global defaults row.
    Defaults,
}

/// Resolves and updates streamer geometry.
#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn Store>,
    scopes: ScopeResolver,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let scopes = ScopeResolver::new(Arc::clone(&store));
        Self { store, scopes }
    }

    /// Built-in constants overlaid with the stored global defaults.
    pub fn base_geometry(&self) -> CoreResult<StreamerGeometry> {
        let defaults = self.store.load_defaults()?;
        Ok(StreamerGeometry::default().layered(&defaults))
    }

    /// Effective geometry for a vessel and optional explicit project.
    ///
    /// A restricted caller's vessel always comes from its scope. An explicit
    /// project wins over the vessel's active project.
    pub fn resolve_config(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
        project_number: Option<&str>,
    ) -> CoreResult<StreamerGeometry> {
        let vessel = scope.effective_vessel(vessel)?;

        let project = match project_number {
            Some(number) => {
                let project = self
                    .store
                    .find_project(number)?
                    .ok_or_else(|| CoreError::not_found("project", number))?;
                scope.ensure_vessel(&project.vessel_tag)?;
                Some(project)
            }
            None => match vessel.as_deref() {
                Some(tag) => self.scopes.resolve(tag)?,
                None => None,
            },
        };

        let mut geometry = self.base_geometry()?;
        if let Some(project) = &project {
            geometry = geometry.layered(&project.geometry);
        }

        let vessel_tag = project.as_ref().map(|p| p.vessel_tag.clone()).or(vessel);
        geometry.active_project_number = match (&vessel_tag, project_number) {
            (Some(tag), Some(_)) => self.scopes.resolve(tag)?.map(|p| p.project_number),
            _ => project.map(|p| p.project_number),
        };
        geometry.vessel_tag = vessel_tag;

        debug!(
            vessel = ?geometry.vessel_tag,
            project = ?geometry.active_project_number,
            sections = geometry.sections_per_cable,
            tail = geometry.tail_sections(),
            "Resolved geometry"
        );
        Ok(geometry)
    }

    /// Write geometry overrides for a vessel context.
    ///
    /// With an active project the present fields are merged into that
    /// project's row. Without one, only an unrestricted admin may change the
    /// global defaults.
    pub fn update_config(
        &self,
        scope: &AccessScope,
        vessel: Option<&str>,
        update: &GeometryOverrides,
    ) -> CoreResult<ConfigTarget> {
        scope.ensure_role(Role::Admin, "updating configuration")?;
        update.validate().map_err(CoreError::validation)?;

        let vessel = scope.effective_vessel(vessel)?;
        let active = match vessel.as_deref() {
            Some(tag) => self.scopes.resolve(tag)?,
            None => None,
        };

        if let Some(project) = active {
            return self.update_project_geometry(scope, project, update);
        }

        if !scope.is_unrestricted() {
            return Err(CoreError::scope(
                "no active project; global defaults require an unrestricted admin",
            ));
        }
        let mut defaults = self.store.load_defaults()?;
        defaults.merge(update);
        self.store.save_defaults(defaults)?;
        info!("Updated global geometry defaults");
        Ok(ConfigTarget::Defaults)
    }

    fn update_project_geometry(
        &self,
        scope: &AccessScope,
        mut project: Project,
        update: &GeometryOverrides,
    ) -> CoreResult<ConfigTarget> {
        scope::ensure_owner(scope, &project)?;
        project.geometry.merge(update);
        let number = project.project_number.clone();
        let id = project.id;
        if !self.store.update_project(project)? {
            return Err(CoreError::not_found("project", id));
        }
        info!(project = %number, "Updated project geometry");
        Ok(ConfigTarget::Project(number))
    }
}
