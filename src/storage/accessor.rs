//! Best-effort extraction and checked injection of page storage.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::storage::{PageExecutor, PageRoutine, StorageError, StorageSnapshot};
use crate::TabId;

/// Runs the storage routines of the session engine against single tabs.
#[derive(Clone)]
pub struct PageStorageAccessor {
    executor: Arc<dyn PageExecutor>,
}

impl PageStorageAccessor {
    pub fn new(executor: Arc<dyn PageExecutor>) -> Self {
        Self { executor }
    }

    /// Capture both storage areas of `tab`.
    ///
    /// Best-effort: any execution failure or malformed result degrades to
    /// an empty snapshot rather than propagating.
    pub async fn extract(&self, tab: TabId) -> StorageSnapshot {
        let results = match self
            .executor
            .run(tab, PageRoutine::ExtractStorage, None)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("storage extraction failed for tab {}: {}", tab, e);
                return StorageSnapshot::empty();
            }
        };

        match results.into_iter().next() {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("malformed storage extraction result for tab {}: {}", tab, e);
                StorageSnapshot::empty()
            }),
            None => StorageSnapshot::empty(),
        }
    }

    /// Write `snapshot` into both storage areas of `tab`.
    ///
    /// All-or-nothing per tab: partial key-level failure cannot be told
    /// apart from systemic failure, so an execution error, a missing
    /// result, or a routine that does not report success all raise
    /// [`StorageError`].
    pub async fn inject(&self, tab: TabId, snapshot: &StorageSnapshot) -> Result<(), StorageError> {
        debug!(
            "injecting storage into tab {}: {} local keys, {} session keys",
            tab,
            snapshot.local_storage.len(),
            snapshot.session_storage.len()
        );

        let args = json!([snapshot.local_storage, snapshot.session_storage]);
        let results = self
            .executor
            .run(tab, PageRoutine::InjectStorage, Some(args))
            .await
            .map_err(|source| StorageError::InjectionFailed { tab, source })?;

        let succeeded = results.first().map_or(false, |r| r == &Value::Bool(true));
        if !succeeded {
            return Err(StorageError::InjectionRejected { tab });
        }

        info!("storage restored for tab {}", tab);
        Ok(())
    }

    /// Remove every key from both storage areas of `tab`.
    ///
    /// Clearing is a deliberate, checked action: failures are raised, not
    /// swallowed.
    pub async fn clear(&self, tab: TabId) -> Result<(), StorageError> {
        self.executor
            .run(tab, PageRoutine::ClearStorage, None)
            .await
            .map(|_| ())
            .map_err(|source| StorageError::ClearFailed { tab, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPageExecutor;

    fn snapshot(local: &[(&str, &str)], session: &[(&str, &str)]) -> StorageSnapshot {
        StorageSnapshot {
            local_storage: local
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            session_storage: session
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn accessor(executor: &Arc<MemoryPageExecutor>) -> PageStorageAccessor {
        PageStorageAccessor::new(Arc::clone(executor) as Arc<dyn PageExecutor>)
    }

    #[tokio::test]
    async fn extracts_seeded_storage() {
        let executor = Arc::new(MemoryPageExecutor::new());
        let tab = TabId(1);
        executor.seed(tab, snapshot(&[("token", "abc")], &[("csrf", "xyz")]));

        let extracted = accessor(&executor).extract(tab).await;
        assert_eq!(
            extracted.local_storage.get("token").map(String::as_str),
            Some("abc")
        );
        assert_eq!(
            extracted.session_storage.get("csrf").map(String::as_str),
            Some("xyz")
        );
    }

    #[tokio::test]
    async fn extraction_degrades_to_empty_on_failure() {
        let executor = Arc::new(MemoryPageExecutor::new());
        executor.seed(TabId(1), snapshot(&[("token", "abc")], &[]));
        executor.fail_execution(true);

        let extracted = accessor(&executor).extract(TabId(1)).await;
        assert!(extracted.is_empty());
    }

    #[tokio::test]
    async fn extraction_of_unknown_tab_is_empty() {
        let executor = Arc::new(MemoryPageExecutor::new());
        let extracted = accessor(&executor).extract(TabId(9)).await;
        assert!(extracted.is_empty());
    }

    #[tokio::test]
    async fn inject_applies_both_areas() {
        let executor = Arc::new(MemoryPageExecutor::new());
        let tab = TabId(1);
        let wanted = snapshot(&[("a", "1")], &[("b", "2")]);

        accessor(&executor).inject(tab, &wanted).await.unwrap();
        assert_eq!(executor.snapshot(tab), wanted);
    }

    #[tokio::test]
    async fn inject_errors_when_execution_fails() {
        let executor = Arc::new(MemoryPageExecutor::new());
        executor.fail_execution(true);

        let err = accessor(&executor)
            .inject(TabId(1), &StorageSnapshot::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InjectionFailed { tab, .. } if tab == TabId(1)));
    }

    #[tokio::test]
    async fn inject_errors_when_page_reports_failure() {
        let executor = Arc::new(MemoryPageExecutor::new());
        executor.reject_injection(true);

        let err = accessor(&executor)
            .inject(TabId(1), &snapshot(&[("a", "1")], &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InjectionRejected { tab } if tab == TabId(1)));
    }

    #[tokio::test]
    async fn clear_empties_both_areas() {
        let executor = Arc::new(MemoryPageExecutor::new());
        let tab = TabId(1);
        executor.seed(tab, snapshot(&[("a", "1")], &[("b", "2")]));

        accessor(&executor).clear(tab).await.unwrap();
        assert!(executor.snapshot(tab).is_empty());
    }

    #[tokio::test]
    async fn clear_errors_when_execution_fails() {
        let executor = Arc::new(MemoryPageExecutor::new());
        executor.fail_execution(true);

        let err = accessor(&executor).clear(TabId(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::ClearFailed { tab, .. } if tab == TabId(1)));
    }
}
