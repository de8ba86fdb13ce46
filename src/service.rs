//! Explicit request/response surface for hosts.
//!
//! [`SessionService`] combines the orchestrator with the session list:
//! every operation a host surface needs, as a typed async method
//! returning a result or a tagged error. Transport, permission checks,
//! and UI stay on the host's side of this boundary.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::cookies::CookieJar;
use crate::session::{
    RepositoryError, SessionData, SessionError, SessionOrchestrator, SessionRepository,
    SessionScope, StoredSession, SwitchOutcome,
};
use crate::storage::{PageExecutor, TabController};
use crate::TabId;

/// Errors surfaced by [`SessionService`].
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("session {id} not found")]
    SessionNotFound { id: String },

    #[error(transparent)]
    Engine(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Facade over the engine and the stored-session list.
pub struct SessionService {
    orchestrator: SessionOrchestrator,
    repository: SessionRepository,
}

impl SessionService {
    pub fn new(orchestrator: SessionOrchestrator, repository: SessionRepository) -> Self {
        Self {
            orchestrator,
            repository,
        }
    }

    /// Build a service directly from host adapters and a repository.
    pub fn with_adapters(
        jar: Arc<dyn CookieJar>,
        executor: Arc<dyn PageExecutor>,
        tabs: Arc<dyn TabController>,
        repository: SessionRepository,
    ) -> Self {
        Self::new(SessionOrchestrator::new(jar, executor, tabs), repository)
    }

    /// Capture the live session of `domain` without storing it.
    pub async fn current_session(
        &self,
        domain: &str,
        tab: TabId,
    ) -> Result<StoredSession, ServiceError> {
        Ok(self.orchestrator.capture(domain, tab).await?)
    }

    /// Capture the live session and store it under `name`; the new entry
    /// becomes the domain's active session.
    pub async fn save_session(
        &self,
        domain: &str,
        tab: TabId,
        name: &str,
        order: Option<u32>,
    ) -> Result<SessionData, ServiceError> {
        let session = self.orchestrator.capture(domain, tab).await?;
        let data = self
            .repository
            .save_session(domain, name, order, session)
            .await?;
        self.repository.set_active(domain, &data.id).await?;
        Ok(data)
    }

    /// Apply a stored session to `tab` and mark it active for its domain.
    ///
    /// Partial restore failures do not fail the call; they are reported
    /// in the returned outcome, and the session still becomes active
    /// because the tab was reloaded into it.
    pub async fn switch_to_session(
        &self,
        session_id: &str,
        tab: TabId,
    ) -> Result<SwitchOutcome, ServiceError> {
        let data = self
            .repository
            .get(session_id)
            .await
            .ok_or_else(|| ServiceError::SessionNotFound {
                id: session_id.to_string(),
            })?;

        let outcome = self.orchestrator.switch_to(&data, tab).await?;
        if !outcome.fully_restored() {
            warn!(
                "session {} applied with partial loss on tab {}",
                session_id, tab
            );
        }

        self.repository.set_active(&data.domain, &data.id).await?;
        info!("session {} is now active for {}", session_id, data.domain);
        Ok(outcome)
    }

    /// Re-capture the live session into an existing entry, keeping its
    /// identity, name, and position.
    pub async fn replace_session(
        &self,
        session_id: &str,
        tab: TabId,
    ) -> Result<SessionData, ServiceError> {
        let existing = self
            .repository
            .get(session_id)
            .await
            .ok_or_else(|| ServiceError::SessionNotFound {
                id: session_id.to_string(),
            })?;

        let session = self.orchestrator.capture(&existing.domain, tab).await?;
        Ok(self.repository.replace(session_id, session).await?)
    }

    pub async fn rename_session(
        &self,
        session_id: &str,
        name: &str,
        order: u32,
    ) -> Result<SessionData, ServiceError> {
        Ok(self.repository.rename(session_id, name, order).await?)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), ServiceError> {
        Ok(self.repository.delete(session_id).await?)
    }

    /// Clear the live state of `domain` in `tab` and forget its stored
    /// sessions. The live clear runs first; if it fails, the stored
    /// sessions are left untouched.
    pub async fn clear_session(&self, domain: &str, tab: TabId) -> Result<(), ServiceError> {
        self.orchestrator.clear(domain, tab).await?;
        self.repository.remove_domain(domain).await?;
        Ok(())
    }

    /// Forget every stored session and active-session entry. Live tabs
    /// are left alone.
    pub async fn clear_all_sessions(&self) -> Result<(), ServiceError> {
        Ok(self.repository.clear_all().await?)
    }

    pub async fn export_sessions(&self, scope: &SessionScope) -> Result<String, ServiceError> {
        Ok(self.repository.export(scope).await?)
    }

    pub async fn import_sessions(&self, json: &str) -> Result<usize, ServiceError> {
        Ok(self.repository.import(json).await?)
    }

    pub async fn list_sessions(&self) -> Vec<SessionData> {
        self.repository.list().await
    }

    pub async fn sessions_for_domain(&self, domain: &str) -> Vec<SessionData> {
        self.repository.sessions_for_domain(domain).await
    }

    pub async fn active_session_for(&self, domain: &str) -> Option<String> {
        self.repository.active_for(domain).await
    }
}
