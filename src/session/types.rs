//! Session data model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cookies::{Cookie, CookieError, RestoreOutcome};
use crate::storage::{StorageError, StorageSnapshot};

/// A point-in-time capture of one site's session state.
///
/// Value object: the engine never mutates a captured snapshot in place;
/// restore operations only read from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub local_storage: HashMap<String, String>,
    #[serde(default)]
    pub session_storage: HashMap<String, String>,
}

impl StoredSession {
    pub fn new(cookies: Vec<Cookie>, storage: StorageSnapshot) -> Self {
        Self {
            cookies,
            local_storage: storage.local_storage,
            session_storage: storage.session_storage,
        }
    }

    /// The storage portion of the capture, as one snapshot.
    pub fn storage(&self) -> StorageSnapshot {
        StorageSnapshot {
            local_storage: self.local_storage.clone(),
            session_storage: self.session_storage.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_storage.is_empty() && self.session_storage.is_empty()
    }
}

/// A stored session plus the identity the session list keeps for it.
///
/// Serializes flat: identity fields and the capture's fields live in one
/// JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: String,
    pub domain: String,
    pub name: String,
    /// Display position among the domain's sessions.
    pub order: u32,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub session: StoredSession,
}

impl SessionData {
    pub fn new(domain: String, name: String, order: u32, session: StoredSession) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain,
            name,
            order,
            created_at: Utc::now(),
            session,
        }
    }

    /// Same payload under a newly generated id, as for imports that must
    /// not collide with existing entries.
    pub(crate) fn with_fresh_id(mut self) -> Self {
        self.id = Uuid::new_v4().to_string();
        self
    }
}

/// Per-channel results of the restore step of a switch.
///
/// A switch keeps going under partial failure: either channel may fail
/// while the other succeeds, and the tab is reloaded regardless. Callers
/// inspect this to report partial loss.
#[derive(Debug)]
pub struct SwitchOutcome {
    pub cookies: Result<RestoreOutcome, CookieError>,
    pub storage: Result<(), StorageError>,
}

impl SwitchOutcome {
    /// Whether every cookie and both storage areas were restored.
    pub fn fully_restored(&self) -> bool {
        matches!(&self.cookies, Ok(outcome) if outcome.is_complete()) && self.storage.is_ok()
    }
}
