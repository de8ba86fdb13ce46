//! Session Switcher
//!
//! Engine for capturing, restoring, and swapping a site's session state
//! (cookies plus page-local and page-session storage), enabling multiple
//! logical identities against one site in one browser profile.
//!
//! Hosts plug the actual cookie jar, page-script execution, and tab
//! control in through the adapter traits ([`cookies::CookieJar`],
//! [`storage::PageExecutor`], [`storage::TabController`]).
//! [`session::SessionOrchestrator`] composes them into the capture,
//! switch, and clear workflows; [`service::SessionService`] layers named
//! sessions, the active-session map, and import/export on top.

pub mod cookies;
pub mod domain;
pub mod memory;
pub mod service;
pub mod session;
pub mod storage;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Error type host adapters report. The engine treats adapter errors as
/// opaque and applies its own policy per call site: degrade to an empty
/// result, count the item as failed, or abort the operation.
pub type AdapterError = anyhow::Error;

/// Identifier of an open tab in the host browser.
///
/// Hosts hand out positive ids for real tabs; non-positive values are
/// placeholders ("no tab") and fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl TabId {
    /// Whether this id can refer to a real tab.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Get log directory path (shared across modules)
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("session-switcher").join("logs"))
}

/// Initialize logging for embedding hosts.
///
/// Console output honours `RUST_LOG`; when a config directory exists, a
/// daily-rolling file layer is added and its non-blocking writer guard is
/// returned. Drop the guard only on shutdown.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "session-switcher.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_id_validity() {
        assert!(TabId(1).is_valid());
        assert!(TabId(42).is_valid());
        assert!(!TabId(0).is_valid());
        assert!(!TabId(-1).is_valid());
    }

    #[test]
    fn tab_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&TabId(7)).unwrap();
        assert_eq!(json, "7");
        let back: TabId = serde_json::from_str("7").unwrap();
        assert_eq!(back, TabId(7));
    }
}
