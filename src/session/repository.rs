//! Persistence for named sessions and the per-domain active-session map.
//!
//! One JSON file holds everything; state is cached in memory and written
//! back on every mutation. An explicit path keeps tests and embedders off
//! the real config directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::session::{RepositoryError, SessionData, StoredSession};

/// Envelope version written by [`SessionRepository::export`].
const EXPORT_VERSION: &str = "1.0";

/// On-disk shape of the session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RepositoryState {
    sessions: Vec<SessionData>,
    /// domain -> id of the session last applied there.
    active_sessions: HashMap<String, String>,
}

/// Scope selector for export operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    All,
    Domain(String),
}

/// Exported session list with provenance metadata.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub export_date: String,
    pub sessions: Vec<SessionData>,
}

/// JSON-file-backed store of captured sessions.
pub struct SessionRepository {
    state: RwLock<RepositoryState>,
    path: Option<PathBuf>,
}

impl SessionRepository {
    /// Open the store at the platform config location, loading whatever
    /// is already there.
    pub fn open_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::with_path(path),
            None => {
                warn!("no config directory available, session store is in-memory only");
                Self::in_memory()
            }
        }
    }

    /// Open the store backed by an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self {
            state: RwLock::new(state),
            path: Some(path),
        }
    }

    /// Store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(RepositoryState::default()),
            path: None,
        }
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("session-switcher").join("sessions.json"))
    }

    /// Load state from file; a missing or unreadable file starts empty.
    fn load(path: &Path) -> RepositoryState {
        if !path.exists() {
            return RepositoryState::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(state) => {
                    info!("loaded session store from {:?}", path);
                    state
                }
                Err(e) => {
                    warn!("failed to parse session store at {:?}: {}", path, e);
                    RepositoryState::default()
                }
            },
            Err(e) => {
                warn!("failed to read session store at {:?}: {}", path, e);
                RepositoryState::default()
            }
        }
    }

    /// Write state back to file (no-op for in-memory stores).
    fn persist(&self, state: &RepositoryState) -> Result<(), RepositoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RepositoryError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let content =
            serde_json::to_string_pretty(state).map_err(|source| RepositoryError::Encode { source })?;
        std::fs::write(path, content).map_err(|source| RepositoryError::Write {
            path: path.clone(),
            source,
        })
    }

    /// Every stored session, unordered.
    pub async fn list(&self) -> Vec<SessionData> {
        self.state.read().await.sessions.clone()
    }

    /// Sessions stored for one domain, in display order.
    pub async fn sessions_for_domain(&self, domain: &str) -> Vec<SessionData> {
        let mut sessions: Vec<SessionData> = self
            .state
            .read()
            .await
            .sessions
            .iter()
            .filter(|s| s.domain == domain)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.order);
        sessions
    }

    pub async fn get(&self, id: &str) -> Option<SessionData> {
        self.state
            .read()
            .await
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Store a fresh capture under `name`. Without an explicit `order`,
    /// the session lands after the domain's current last one.
    pub async fn save_session(
        &self,
        domain: &str,
        name: &str,
        order: Option<u32>,
        session: StoredSession,
    ) -> Result<SessionData, RepositoryError> {
        let mut state = self.state.write().await;

        let order = order.unwrap_or_else(|| {
            state
                .sessions
                .iter()
                .filter(|s| s.domain == domain)
                .map(|s| s.order)
                .max()
                .map_or(1, |max| max + 1)
        });

        let data = SessionData::new(domain.to_string(), name.to_string(), order, session);
        state.sessions.push(data.clone());
        self.persist(&state)?;

        info!("saved session {} ({}) for {}", data.id, data.name, domain);
        Ok(data)
    }

    /// Change a session's display name and position.
    pub async fn rename(
        &self,
        id: &str,
        name: &str,
        order: u32,
    ) -> Result<SessionData, RepositoryError> {
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;

        session.name = name.to_string();
        session.order = order;
        let updated = session.clone();

        self.persist(&state)?;
        Ok(updated)
    }

    /// Swap a session's captured payload, keeping its identity, name, and
    /// position.
    pub async fn replace(
        &self,
        id: &str,
        session: StoredSession,
    ) -> Result<SessionData, RepositoryError> {
        let mut state = self.state.write().await;
        let entry = state
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;

        entry.session = session;
        let updated = entry.clone();

        self.persist(&state)?;
        info!("replaced payload of session {} ({})", updated.id, updated.name);
        Ok(updated)
    }

    /// Remove one session; active-map entries pointing at it are dropped.
    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.id != id);
        if state.sessions.len() == before {
            return Err(RepositoryError::NotFound { id: id.to_string() });
        }
        state.active_sessions.retain(|_, active| active != id);

        self.persist(&state)?;
        info!("deleted session {}", id);
        Ok(())
    }

    /// Forget every session stored for `domain`. Returns how many were
    /// removed.
    pub async fn remove_domain(&self, domain: &str) -> Result<usize, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|s| s.domain != domain);
        let removed = before - state.sessions.len();
        state.active_sessions.remove(domain);

        self.persist(&state)?;
        Ok(removed)
    }

    /// Wipe all sessions and the whole active map.
    pub async fn clear_all(&self) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        *state = RepositoryState::default();
        self.persist(&state)?;
        info!("cleared all stored sessions");
        Ok(())
    }

    /// Record which session is currently applied for `domain`.
    pub async fn set_active(&self, domain: &str, id: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .active_sessions
            .insert(domain.to_string(), id.to_string());
        self.persist(&state)
    }

    pub async fn active_for(&self, domain: &str) -> Option<String> {
        self.state.read().await.active_sessions.get(domain).cloned()
    }

    pub async fn clear_active(&self, domain: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.active_sessions.remove(domain);
        self.persist(&state)
    }

    /// Serialize stored sessions to a pretty-printed export envelope.
    pub async fn export(&self, scope: &SessionScope) -> Result<String, RepositoryError> {
        let state = self.state.read().await;
        let sessions: Vec<SessionData> = match scope {
            SessionScope::All => state.sessions.clone(),
            SessionScope::Domain(domain) => state
                .sessions
                .iter()
                .filter(|s| &s.domain == domain)
                .cloned()
                .collect(),
        };

        let envelope = ExportEnvelope {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now().to_rfc3339(),
            sessions,
        };

        serde_json::to_string_pretty(&envelope).map_err(|source| RepositoryError::Encode { source })
    }

    /// Merge sessions from an export envelope into the store.
    ///
    /// Every imported session gets a fresh id so imports never collide
    /// with existing entries. Returns how many sessions were imported.
    pub async fn import(&self, json: &str) -> Result<usize, RepositoryError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|_| RepositoryError::InvalidImport {
                reason: "invalid JSON".to_string(),
            })?;

        let sessions = value
            .get("sessions")
            .and_then(|s| s.as_array())
            .ok_or_else(|| RepositoryError::InvalidImport {
                reason: "missing sessions array".to_string(),
            })?;

        let imported: Vec<SessionData> =
            serde_json::from_value(serde_json::Value::Array(sessions.clone())).map_err(|e| {
                RepositoryError::InvalidImport {
                    reason: format!("malformed session entry: {}", e),
                }
            })?;

        let count = imported.len();
        let mut state = self.state.write().await;
        state
            .sessions
            .extend(imported.into_iter().map(SessionData::with_fresh_id));
        self.persist(&state)?;

        info!("imported {} sessions", count);
        Ok(count)
    }
}
