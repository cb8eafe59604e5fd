//! Capability value passed into every resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Tiered role. Each tier includes the capabilities of the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    Viewer,
    /// Records cleanings and deployments.
    Operator,
    /// Manages projects, configuration and bulk deletion.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Operator => "operator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "operator" => Ok(Role::Operator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Which vessels a caller may see and act on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VesselScope {
    /// Every vessel.
    All,
    /// A single vessel tag.
    Vessel(String),
}

/// Identity and authority of a caller, produced upstream of the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessScope {
    pub role: Role,
    pub vessel: VesselScope,
}

impl AccessScope {
    pub fn new(role: Role, vessel: VesselScope) -> Self {
        Self { role, vessel }
    }

    /// Caller not bound to any vessel.
    pub fn unrestricted(role: Role) -> Self {
        Self::new(role, VesselScope::All)
    }

    /// Caller bound to one vessel.
    pub fn for_vessel(role: Role, vessel_tag: impl Into<String>) -> Self {
        Self::new(role, VesselScope::Vessel(vessel_tag.into()))
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self.vessel, VesselScope::All)
    }

    /// The vessel a restricted caller is bound to.
    pub fn vessel_tag(&self) -> Option<&str> {
        match &self.vessel {
            VesselScope::All => None,
            VesselScope::Vessel(tag) => Some(tag),
        }
    }

    pub fn can_access_vessel(&self, vessel_tag: &str) -> bool {
        match &self.vessel {
            VesselScope::All => true,
            VesselScope::Vessel(tag) => tag == vessel_tag,
        }
    }

    /// Fail unless the caller may act on `vessel_tag`.
    pub fn ensure_vessel(&self, vessel_tag: &str) -> CoreResult<()> {
        if self.can_access_vessel(vessel_tag) {
            Ok(())
        } else {
            Err(CoreError::scope(format!(
                "caller scoped to vessel {} cannot act on vessel {}",
                self.vessel_tag().unwrap_or("-"),
                vessel_tag
            )))
        }
    }

    /// Fail unless the caller holds at least `required`.
    pub fn ensure_role(&self, required: Role, action: &str) -> CoreResult<()> {
        if self.role >= required {
            Ok(())
        } else {
            Err(CoreError::scope(format!(
                "{} requires the {} role (caller is {})",
                action, required, self.role
            )))
        }
    }

    /// Fail unless the caller is an unrestricted admin.
    pub fn ensure_privileged(&self, action: &str) -> CoreResult<()> {
        self.ensure_role(Role::Admin, action)?;
        if !self.is_unrestricted() {
            return Err(CoreError::scope(format!(
                "{} requires an unrestricted caller",
                action
            )));
        }
        Ok(())
    }

    /// The vessel a request operates on.
    ///
    /// A restricted caller always operates on its own vessel; naming a
    /// different one is a violation. An unrestricted caller gets whatever it
    /// asked for, possibly none.
    pub fn effective_vessel(&self, requested: Option<&str>) -> CoreResult<Option<String>> {
        match (&self.vessel, requested) {
            (VesselScope::All, requested) => Ok(requested.map(String::from)),
            (VesselScope::Vessel(own), None) => Ok(Some(own.clone())),
            (VesselScope::Vessel(own), Some(requested)) => {
                self.ensure_vessel(requested)?;
                Ok(Some(own.clone()))
            }
        }
    }
}

impl fmt::Display for AccessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vessel {
            VesselScope::All => write!(f, "{}@all", self.role),
            VesselScope::Vessel(tag) => write!(f, "{}@{}", self.role, tag),
        }
    }
}
