//! Cookie data model shared between the engine and host adapters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an isolated cookie store in the host browser.
///
/// A host may expose several stores (e.g. normal vs. partitioned
/// browsing contexts); cookies are always addressed within one store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `SameSite` attribute values the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

impl SameSite {
    /// Whether this is a recognized non-default value worth carrying into
    /// a set request.
    pub fn is_explicit(self) -> bool {
        !matches!(self, SameSite::Unspecified)
    }
}

/// A cookie as reported by the host's cookie jar.
///
/// A leading `.` on `domain` means "this cookie and subdomains"; no dot
/// marks a host-only cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// True for session cookies, which carry no expiration.
    pub session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    /// Seconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    pub store_id: StoreId,
}

/// Everything the host needs to create or overwrite one cookie.
///
/// `domain` is present only for cookies that should be visible to
/// subdomains; host-only cookies derive their domain from `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookieRequest {
    pub url: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub store_id: StoreId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

/// Counters from a batch cookie restore.
///
/// Individual failures never abort a batch; `restored + failed` always
/// equals the number of cookies attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored: usize,
    pub failed: usize,
}

impl RestoreOutcome {
    pub fn attempted(&self) -> usize {
        self.restored + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}
