//! Capture, switch, and clear workflows over the cookie and storage adapters.

use std::sync::Arc;

use tracing::{error, info};

use crate::cookies::{CookieJar, CookieManager};
use crate::session::{PhaseFailure, SessionData, SessionError, StoredSession, SwitchOutcome};
use crate::storage::{PageExecutor, PageStorageAccessor, TabController};
use crate::TabId;

/// Orchestrates session capture, switching, and clearing for one host.
///
/// Owns nothing but adapters (a cookie jar, a page executor, and tab
/// control), all injected at construction. Callers are expected to
/// serialize operations that target the same tab; the orchestrator does
/// not lock per tab.
pub struct SessionOrchestrator {
    cookies: CookieManager,
    storage: PageStorageAccessor,
    tabs: Arc<dyn TabController>,
}

impl SessionOrchestrator {
    pub fn new(
        jar: Arc<dyn CookieJar>,
        executor: Arc<dyn PageExecutor>,
        tabs: Arc<dyn TabController>,
    ) -> Self {
        Self {
            cookies: CookieManager::new(jar),
            storage: PageStorageAccessor::new(executor),
            tabs,
        }
    }

    fn validate(domain: &str, tab: TabId) -> Result<(), SessionError> {
        if domain.trim().is_empty() {
            return Err(SessionError::MissingDomain);
        }
        if !tab.is_valid() {
            return Err(SessionError::InvalidTab(tab));
        }
        Ok(())
    }

    /// Capture the current session of `domain` as seen from `tab`.
    ///
    /// Read-only: cookies and storage are fetched concurrently, and both
    /// reads degrade to empty rather than failing, so a capture can only
    /// be rejected by validation.
    pub async fn capture(&self, domain: &str, tab: TabId) -> Result<StoredSession, SessionError> {
        Self::validate(domain, tab)?;

        let (cookies, storage) = tokio::join!(
            self.cookies.list_for_domain(domain),
            self.storage.extract(tab),
        );

        info!(
            "captured session for {}: {} cookies, {} local keys, {} session keys",
            domain,
            cookies.len(),
            storage.local_storage.len(),
            storage.session_storage.len()
        );

        Ok(StoredSession::new(cookies, storage))
    }

    /// Switch `tab` to a previously captured session.
    ///
    /// Protocol, in order: validate; clear the domain's current cookies;
    /// restore cookies and storage concurrently; reload the tab. The
    /// restore step tolerates partial failure: its per-channel results
    /// travel in the returned [`SwitchOutcome`] and the reload runs even
    /// when restore reported failures, so the page observes whatever was
    /// applied. A validation or clear-phase failure aborts before any
    /// further mutation.
    pub async fn switch_to(
        &self,
        data: &SessionData,
        tab: TabId,
    ) -> Result<SwitchOutcome, SessionError> {
        Self::validate(&data.domain, tab)?;
        let domain = &data.domain;

        info!("switching to session {} for {} on tab {}", data.id, domain, tab);

        self.cookies
            .clear_for_domain(domain)
            .await
            .map_err(|e| SessionError::SwitchFailed {
                domain: domain.clone(),
                source: PhaseFailure::Cookies(e),
            })?;

        let snapshot = data.session.storage();
        let (cookie_result, storage_result) = tokio::join!(
            self.cookies.restore(&data.session.cookies, domain),
            self.storage.inject(tab, &snapshot),
        );

        if let Err(e) = &cookie_result {
            error!("cookie restore failed during switch for {}: {}", domain, e);
        }
        if let Err(e) = &storage_result {
            error!("storage restore failed during switch on tab {}: {}", tab, e);
        }

        self.tabs
            .reload(tab)
            .await
            .map_err(|source| SessionError::SwitchFailed {
                domain: domain.clone(),
                source: PhaseFailure::Reload { tab, source },
            })?;

        info!("session switch completed for {} (tab {} reloaded)", domain, tab);

        Ok(SwitchOutcome {
            cookies: cookie_result,
            storage: storage_result,
        })
    }

    /// Remove the current session state of `domain` from `tab`.
    ///
    /// Cookies and storage are cleared concurrently and the call fails
    /// fast: if either side fails, the whole operation errors and the tab
    /// is not reloaded, so a page is never presented whose state could
    /// not be fully cleared.
    pub async fn clear(&self, domain: &str, tab: TabId) -> Result<(), SessionError> {
        Self::validate(domain, tab)?;

        let wrap = |source: PhaseFailure| SessionError::ClearFailed {
            domain: domain.to_string(),
            source,
        };

        tokio::try_join!(
            async {
                self.cookies
                    .clear_for_domain(domain)
                    .await
                    .map_err(|e| wrap(PhaseFailure::Cookies(e)))
            },
            async {
                self.storage
                    .clear(tab)
                    .await
                    .map_err(|e| wrap(PhaseFailure::Storage(e)))
            },
        )?;

        self.tabs
            .reload(tab)
            .await
            .map_err(|source| wrap(PhaseFailure::Reload { tab, source }))?;

        info!("cleared session for {} and reloaded tab {}", domain, tab);
        Ok(())
    }
}
