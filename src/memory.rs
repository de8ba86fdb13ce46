//! In-memory adapter implementations.
//!
//! Reference backends for the adapter traits: hosts use them in tests and
//! incognito-style embedding, and the crate's own tests drive the whole
//! engine through them. Each adapter supports failure injection so the
//! degraded paths are observable.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::cookies::{Cookie, CookieJar, SetCookieRequest, StoreId};
use crate::storage::{PageExecutor, PageRoutine, StorageSnapshot, TabController};
use crate::{AdapterError, TabId};

/// Cookie jar holding any number of isolated in-memory stores.
#[derive(Default)]
pub struct MemoryCookieJar {
    stores: Mutex<BTreeMap<StoreId, Vec<Cookie>>>,
    set_requests: Mutex<Vec<SetCookieRequest>>,
    fail_listing: AtomicBool,
    fail_removals: AtomicBool,
    fail_sets: AtomicBool,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie to its store, creating the store on first use.
    pub fn insert(&self, cookie: Cookie) {
        let mut stores = self.stores.lock().unwrap();
        stores
            .entry(cookie.store_id.clone())
            .or_default()
            .push(cookie);
    }

    /// Every cookie across all stores, in store order.
    pub fn cookies(&self) -> Vec<Cookie> {
        let stores = self.stores.lock().unwrap();
        stores.values().flatten().cloned().collect()
    }

    /// Every set request received, in arrival order.
    pub fn set_requests(&self) -> Vec<SetCookieRequest> {
        self.set_requests.lock().unwrap().clone()
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::Relaxed);
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::Relaxed);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl CookieJar for MemoryCookieJar {
    async fn list_stores(&self) -> Result<Vec<StoreId>, AdapterError> {
        if self.fail_listing.load(Ordering::Relaxed) {
            return Err(anyhow!("cookie store enumeration unavailable"));
        }
        Ok(self.stores.lock().unwrap().keys().cloned().collect())
    }

    async fn list_cookies(&self, store: &StoreId) -> Result<Vec<Cookie>, AdapterError> {
        if self.fail_listing.load(Ordering::Relaxed) {
            return Err(anyhow!("cookie listing unavailable"));
        }
        Ok(self
            .stores
            .lock()
            .unwrap()
            .get(store)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_cookie(
        &self,
        url: &str,
        name: &str,
        store: &StoreId,
    ) -> Result<(), AdapterError> {
        if self.fail_removals.load(Ordering::Relaxed) {
            return Err(anyhow!("cookie removal rejected"));
        }

        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| anyhow!("invalid cookie url: {url}"))?;

        let mut stores = self.stores.lock().unwrap();
        if let Some(cookies) = stores.get_mut(store) {
            cookies.retain(|c| {
                let bare = c.domain.trim_start_matches('.');
                !(c.name == name && (bare == host || host.ends_with(bare)))
            });
        }
        Ok(())
    }

    async fn set_cookie(&self, request: SetCookieRequest) -> Result<(), AdapterError> {
        if self.fail_sets.load(Ordering::Relaxed) {
            return Err(anyhow!("cookie write rejected"));
        }

        // Host-only cookies derive their domain from the request URL.
        let domain = match &request.domain {
            Some(domain) => domain.clone(),
            None => url::Url::parse(&request.url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .ok_or_else(|| anyhow!("invalid cookie url: {}", request.url))?,
        };

        let cookie = Cookie {
            name: request.name.clone(),
            value: request.value.clone(),
            domain,
            path: request.path.clone(),
            secure: request.secure,
            http_only: request.http_only,
            session: request.expiration_date.is_none(),
            same_site: request.same_site,
            expiration_date: request.expiration_date,
            store_id: request.store_id.clone(),
        };

        {
            let mut stores = self.stores.lock().unwrap();
            let cookies = stores.entry(request.store_id.clone()).or_default();
            cookies.retain(|c| {
                !(c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path)
            });
            cookies.push(cookie);
        }

        self.set_requests.lock().unwrap().push(request);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct PageState {
    local: HashMap<String, String>,
    session: HashMap<String, String>,
}

/// Page executor simulating the two storage areas of each tab.
#[derive(Default)]
pub struct MemoryPageExecutor {
    pages: Mutex<HashMap<TabId, PageState>>,
    fail_execution: AtomicBool,
    reject_injection: AtomicBool,
}

impl MemoryPageExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a tab's storage areas.
    pub fn seed(&self, tab: TabId, snapshot: StorageSnapshot) {
        self.pages.lock().unwrap().insert(
            tab,
            PageState {
                local: snapshot.local_storage,
                session: snapshot.session_storage,
            },
        );
    }

    /// Current contents of a tab's storage areas.
    pub fn snapshot(&self, tab: TabId) -> StorageSnapshot {
        let pages = self.pages.lock().unwrap();
        let state = pages.get(&tab).cloned().unwrap_or_default();
        StorageSnapshot {
            local_storage: state.local,
            session_storage: state.session,
        }
    }

    /// Make every routine execution fail, as when a page is unreachable.
    pub fn fail_execution(&self, fail: bool) {
        self.fail_execution.store(fail, Ordering::Relaxed);
    }

    /// Make injection run but report failure from the page.
    pub fn reject_injection(&self, reject: bool) {
        self.reject_injection.store(reject, Ordering::Relaxed);
    }
}

#[async_trait]
impl PageExecutor for MemoryPageExecutor {
    async fn run(
        &self,
        tab: TabId,
        routine: PageRoutine,
        args: Option<Value>,
    ) -> Result<Vec<Value>, AdapterError> {
        if self.fail_execution.load(Ordering::Relaxed) {
            return Err(anyhow!("script execution unavailable for tab {tab}"));
        }

        match routine {
            PageRoutine::ExtractStorage => {
                let snapshot = self.snapshot(tab);
                Ok(vec![serde_json::to_value(snapshot)?])
            }
            PageRoutine::InjectStorage => {
                if self.reject_injection.load(Ordering::Relaxed) {
                    return Ok(vec![json!(false)]);
                }
                let args = args.ok_or_else(|| anyhow!("injection routine needs arguments"))?;
                let (local, session): (HashMap<String, String>, HashMap<String, String>) =
                    serde_json::from_value(args)?;
                self.pages
                    .lock()
                    .unwrap()
                    .insert(tab, PageState { local, session });
                Ok(vec![json!(true)])
            }
            PageRoutine::ClearStorage => {
                self.pages.lock().unwrap().insert(tab, PageState::default());
                Ok(vec![Value::Null])
            }
        }
    }
}

/// Tab controller that counts reloads instead of driving a browser.
#[derive(Default)]
pub struct MemoryTabs {
    reloads: Mutex<HashMap<TabId, usize>>,
    fail_reloads: AtomicBool,
}

impl MemoryTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `tab` was reloaded.
    pub fn reload_count(&self, tab: TabId) -> usize {
        self.reloads.lock().unwrap().get(&tab).copied().unwrap_or(0)
    }

    pub fn fail_reloads(&self, fail: bool) {
        self.fail_reloads.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl TabController for MemoryTabs {
    async fn reload(&self, tab: TabId) -> Result<(), AdapterError> {
        if self.fail_reloads.load(Ordering::Relaxed) {
            return Err(anyhow!("tab {tab} cannot be reloaded"));
        }
        *self.reloads.lock().unwrap().entry(tab).or_insert(0) += 1;
        Ok(())
    }
}
