//! Page-context execution and tab-control boundaries.

use async_trait::async_trait;
use serde_json::Value;

use crate::{AdapterError, TabId};

/// Named routines the engine runs inside a page's isolated context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRoutine {
    /// Read both storage areas; resolves to
    /// `{"localStorage": {...}, "sessionStorage": {...}}`.
    ExtractStorage,
    /// Write both storage areas from `[localStorage, sessionStorage]`
    /// args; resolves to an explicit success boolean.
    InjectStorage,
    /// Remove every key from both storage areas.
    ClearStorage,
}

/// Executes routines inside a specific page's isolated context.
///
/// `run` resolves with one result per document frame the routine ran in;
/// the engine reads the top frame's result (first element).
#[async_trait]
pub trait PageExecutor: Send + Sync {
    async fn run(
        &self,
        tab: TabId,
        routine: PageRoutine,
        args: Option<Value>,
    ) -> Result<Vec<Value>, AdapterError>;
}

/// The one piece of tab lifecycle the engine drives: reloading a tab so
/// the page observes freshly applied cookies and storage.
#[async_trait]
pub trait TabController: Send + Sync {
    async fn reload(&self, tab: TabId) -> Result<(), AdapterError>;
}
