//! Session-layer error types

use std::path::PathBuf;

use thiserror::Error;

use crate::cookies::CookieError;
use crate::storage::StorageError;
use crate::{AdapterError, TabId};

/// Failure of one phase of an orchestrated operation.
#[derive(Error, Debug)]
pub enum PhaseFailure {
    #[error(transparent)]
    Cookies(#[from] CookieError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("tab reload failed for tab {tab}")]
    Reload {
        tab: TabId,
        #[source]
        source: AdapterError,
    },
}

/// Errors surfaced by the session orchestrator.
///
/// Validation variants are raised before any side effect; the operation
/// variants wrap a hard phase failure with the operation's context.
/// Partial restore failures never appear here; they travel in the switch
/// outcome instead.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The tab id cannot refer to a real tab.
    #[error("invalid tab id {0}")]
    InvalidTab(TabId),

    /// The operation had no target domain to work against.
    #[error("session data is missing a target domain")]
    MissingDomain,

    /// A hard failure aborted a switch; when the failing phase was the
    /// initial clear, the tab was left untouched.
    #[error("failed to switch session for {domain}")]
    SwitchFailed {
        domain: String,
        #[source]
        source: PhaseFailure,
    },

    /// A hard failure aborted a clear; the tab was not reloaded.
    #[error("failed to clear session for {domain}")]
    ClearFailed {
        domain: String,
        #[source]
        source: PhaseFailure,
    },
}

/// Session-list persistence errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("session {id} not found")]
    NotFound { id: String },

    #[error("failed to write session store at {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode session export")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid session import: {reason}")]
    InvalidImport { reason: String },
}
