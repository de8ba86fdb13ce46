//! Storage-layer error types

use thiserror::Error;

use crate::{AdapterError, TabId};

/// Page-storage errors.
///
/// Injection and clearing are all-or-nothing per tab; extraction degrades
/// to an empty snapshot instead of erroring.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The injection routine could not be executed at all.
    #[error("storage injection failed for tab {tab}")]
    InjectionFailed {
        tab: TabId,
        #[source]
        source: AdapterError,
    },

    /// The injection routine ran but did not report success.
    #[error("page reported storage injection failure for tab {tab}")]
    InjectionRejected { tab: TabId },

    /// The clearing routine failed or could not be executed.
    #[error("failed to clear storage for tab {tab}")]
    ClearFailed {
        tab: TabId,
        #[source]
        source: AdapterError,
    },
}
