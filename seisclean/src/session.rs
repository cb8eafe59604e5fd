//! Process-wide session table.
//!
//! Maps opaque tokens to the identity and [`AccessScope`] established at
//! login. Credentials are checked upstream; this table only remembers the
//! outcome. Entries live until logout.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::scope::AccessScope;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub scope: AccessScope,
    pub created_at: DateTime<Utc>,
}

/// Token → session map, shared by reference between request handlers.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: DashMap<String, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and return its token.
    pub fn login(&self, username: impl Into<String>, scope: AccessScope) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            username: username.into(),
            scope,
            created_at: Utc::now(),
        };
        info!(user = %session.username, scope = %session.scope, "Session opened");
        self.sessions.insert(token.clone(), session);
        token
    }

    /// Look up a session by token.
    pub fn lookup(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    /// The scope behind a token, or `NotFound` for an unknown token.
    pub fn authorize(&self, token: &str) -> CoreResult<AccessScope> {
        self.lookup(token)
            .map(|session| session.scope)
            .ok_or_else(|| CoreError::not_found("session", "<token>"))
    }

    /// Drop a session. Returns whether it existed.
    pub fn logout(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                info!(user = %session.username, "Session closed");
                true
            }
            None => {
                debug!("Logout for unknown token");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
