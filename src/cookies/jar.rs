//! Host cookie-jar boundary.

use async_trait::async_trait;

use crate::cookies::{Cookie, SetCookieRequest, StoreId};
use crate::AdapterError;

/// Access to the host browser's cookie jars.
///
/// Implementations wrap whatever the host exposes (an extension API, a
/// devtools-protocol connection, an embedded engine) and must be cheap to
/// share: the engine holds them as `Arc<dyn CookieJar>`. Failures are
/// reported as [`AdapterError`]; the engine decides per call site whether
/// a failure degrades, is counted, or aborts.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Enumerate the isolated cookie stores the host exposes.
    async fn list_stores(&self) -> Result<Vec<StoreId>, AdapterError>;

    /// List every cookie in one store.
    async fn list_cookies(&self, store: &StoreId) -> Result<Vec<Cookie>, AdapterError>;

    /// Remove one cookie, addressed by retrieval URL, name, and store.
    async fn remove_cookie(
        &self,
        url: &str,
        name: &str,
        store: &StoreId,
    ) -> Result<(), AdapterError>;

    /// Create or overwrite one cookie.
    async fn set_cookie(&self, request: SetCookieRequest) -> Result<(), AdapterError>;
}
