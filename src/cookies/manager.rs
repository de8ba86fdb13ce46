//! Cookie selection, clearing, and restoration against a host jar.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cookies::{Cookie, CookieError, CookieJar, RestoreOutcome, SetCookieRequest};
use crate::domain;
use crate::AdapterError;

/// Cookie-store adapter: wraps a host [`CookieJar`] with the domain
/// selection and batch policies of the session engine.
#[derive(Clone)]
pub struct CookieManager {
    jar: Arc<dyn CookieJar>,
}

impl CookieManager {
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self { jar }
    }

    /// List every cookie belonging to `domain` across all cookie stores.
    ///
    /// Any adapter failure degrades to an empty result; listing never
    /// surfaces an error to callers.
    pub async fn list_for_domain(&self, domain: &str) -> Vec<Cookie> {
        match self.collect_for_domain(domain).await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("cookie listing for {} degraded to empty: {}", domain, e);
                Vec::new()
            }
        }
    }

    /// Fallible listing shared by the capture and clear paths. The clear
    /// path propagates a failure here instead of silently clearing
    /// nothing.
    async fn collect_for_domain(&self, domain: &str) -> Result<Vec<Cookie>, AdapterError> {
        let target = domain::strip_port(domain);
        let stores = self.jar.list_stores().await?;

        let mut matched = Vec::new();
        for store in &stores {
            let cookies = self.jar.list_cookies(store).await?;
            matched.extend(
                cookies
                    .into_iter()
                    .filter(|c| domain::cookie_matches_domain(&c.domain, target)),
            );
        }

        debug!("{} cookies matched domain {}", matched.len(), target);
        Ok(matched)
    }

    /// Remove every cookie currently matching `domain`.
    ///
    /// Removals run concurrently, one per cookie; individual failures are
    /// logged and skipped. A failed listing aborts before anything is
    /// removed. Returns how many cookies were actually removed.
    pub async fn clear_for_domain(&self, domain: &str) -> Result<usize, CookieError> {
        let cookies = self
            .collect_for_domain(domain)
            .await
            .map_err(|source| CookieError::ListingFailed {
                domain: domain.to_string(),
                source,
            })?;
        let total = cookies.len();

        let removals = cookies.iter().map(|cookie| {
            let jar = Arc::clone(&self.jar);
            async move {
                let url = match build_cookie_url(cookie, domain) {
                    Ok(url) => url,
                    Err(e) => {
                        warn!("skipping removal of cookie {}: {}", cookie.name, e);
                        return false;
                    }
                };
                match jar.remove_cookie(&url, &cookie.name, &cookie.store_id).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("failed to remove cookie {}: {}", cookie.name, e);
                        false
                    }
                }
            }
        });

        let removed = join_all(removals).await.into_iter().filter(|ok| *ok).count();
        info!("cleared {}/{} cookies for domain {}", removed, total, domain);
        Ok(removed)
    }

    /// Restore a captured cookie set against `domain`.
    ///
    /// Fails fast on an empty target domain, before touching any cookie.
    /// Every cookie is then set independently and concurrently: entries
    /// without a name and entries whose retrieval URL cannot be built are
    /// counted as failures without aborting the batch, as are individual
    /// set failures. The returned counters always sum to the attempted
    /// total.
    pub async fn restore(
        &self,
        cookies: &[Cookie],
        domain: &str,
    ) -> Result<RestoreOutcome, CookieError> {
        if domain.trim().is_empty() {
            return Err(CookieError::EmptyRestoreDomain);
        }

        info!("restoring {} cookies for domain {}", cookies.len(), domain);

        let attempts = cookies.iter().map(|cookie| {
            let jar = Arc::clone(&self.jar);
            async move {
                if cookie.name.is_empty() {
                    warn!("skipping cookie without a name for domain {}", domain);
                    return false;
                }
                let request = match prepare_restore(cookie, domain) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!("cannot prepare cookie {} for restore: {}", cookie.name, e);
                        return false;
                    }
                };
                match jar.set_cookie(request).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("failed to restore cookie {}: {}", cookie.name, e);
                        false
                    }
                }
            }
        });

        let mut outcome = RestoreOutcome::default();
        for ok in join_all(attempts).await {
            if ok {
                outcome.restored += 1;
            } else {
                outcome.failed += 1;
            }
        }

        info!(
            "cookie restoration complete for {} - restored: {}, failed: {}",
            domain, outcome.restored, outcome.failed
        );
        Ok(outcome)
    }
}

/// Build the retrieval URL a cookie is addressed by: scheme from the
/// secure flag, host from the cookie's normalized domain (falling back to
/// the caller's target domain), path defaulting to `/`.
fn build_cookie_url(cookie: &Cookie, fallback_domain: &str) -> Result<String, CookieError> {
    let scheme = if cookie.secure { "https" } else { "http" };

    let mut host = domain::strip_leading_dot(&cookie.domain);
    if host.is_empty() {
        host = fallback_domain;
    }
    if host.is_empty() {
        return Err(CookieError::NoUsableDomain {
            name: cookie.name.clone(),
            domain: cookie.domain.clone(),
        });
    }

    let path = if cookie.path.is_empty() { "/" } else { &cookie.path };
    Ok(format!("{}://{}{}", scheme, host, path))
}

/// Translate a captured cookie into a set request.
///
/// Host-only cookies (no leading dot) must not be given an explicit
/// domain; session cookies must not carry an expiration; `sameSite` is
/// forwarded only when it is a recognized non-default value.
fn prepare_restore(cookie: &Cookie, fallback_domain: &str) -> Result<SetCookieRequest, CookieError> {
    let url = build_cookie_url(cookie, fallback_domain)?;

    let explicit_domain = cookie
        .domain
        .starts_with('.')
        .then(|| cookie.domain.clone());

    let expiration_date = if cookie.session {
        None
    } else {
        cookie.expiration_date
    };

    Ok(SetCookieRequest {
        url,
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        path: cookie.path.clone(),
        secure: cookie.secure,
        http_only: cookie.http_only,
        store_id: cookie.store_id.clone(),
        domain: explicit_domain,
        expiration_date,
        same_site: cookie.same_site.filter(|s| s.is_explicit()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{SameSite, StoreId};
    use crate::memory::MemoryCookieJar;

    fn cookie(name: &str, domain: &str, store: &str) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: format!("{}-value", name),
            domain: domain.to_string(),
            path: "/".to_string(),
            secure: false,
            http_only: false,
            session: true,
            same_site: None,
            expiration_date: None,
            store_id: StoreId::new(store),
        }
    }

    fn manager(jar: &Arc<MemoryCookieJar>) -> CookieManager {
        CookieManager::new(Arc::clone(jar) as Arc<dyn CookieJar>)
    }

    #[tokio::test]
    async fn lists_matching_cookies_across_stores() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.insert(cookie("a", "example.com", "0"));
        jar.insert(cookie("b", ".example.com", "partitioned"));
        jar.insert(cookie("c", "www.example.com", "0"));
        jar.insert(cookie("d", "other.com", "0"));

        let listed = manager(&jar).list_for_domain("example.com").await;
        let mut names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn listing_strips_target_port() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.insert(cookie("a", "example.com", "0"));

        let listed = manager(&jar).list_for_domain("example.com:8080").await;
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn listing_degrades_to_empty_on_adapter_failure() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.insert(cookie("a", "example.com", "0"));
        jar.fail_listing(true);

        let listed = manager(&jar).list_for_domain("example.com").await;
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_only_matching_cookies() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.insert(cookie("a", "example.com", "0"));
        jar.insert(cookie("b", ".example.com", "0"));
        jar.insert(cookie("c", "other.com", "0"));

        let removed = manager(&jar).clear_for_domain("example.com").await.unwrap();
        assert_eq!(removed, 2);

        let remaining = jar.cookies();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "c");
    }

    #[tokio::test]
    async fn clear_skips_individual_removal_failures() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.insert(cookie("a", "example.com", "0"));
        jar.insert(cookie("b", "example.com", "0"));
        jar.fail_removals(true);

        // Individual removal failures never fail the operation.
        let removed = manager(&jar).clear_for_domain("example.com").await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(jar.cookies().len(), 2);
    }

    #[tokio::test]
    async fn clear_propagates_listing_failure() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.fail_listing(true);

        let err = manager(&jar).clear_for_domain("example.com").await.unwrap_err();
        assert!(matches!(err, CookieError::ListingFailed { ref domain, .. } if domain == "example.com"));
    }

    #[tokio::test]
    async fn restore_rejects_empty_domain_before_any_write() {
        let jar = Arc::new(MemoryCookieJar::new());
        let cookies = vec![cookie("a", "example.com", "0")];

        let err = manager(&jar).restore(&cookies, "").await.unwrap_err();
        assert!(matches!(err, CookieError::EmptyRestoreDomain));
        assert!(jar.set_requests().is_empty());
    }

    #[tokio::test]
    async fn restore_counts_nameless_cookies_without_aborting() {
        let jar = Arc::new(MemoryCookieJar::new());
        let cookies = vec![
            cookie("a", "example.com", "0"),
            cookie("", "example.com", "0"),
            cookie("c", "example.com", "0"),
        ];

        let outcome = manager(&jar).restore(&cookies, "example.com").await.unwrap();
        assert_eq!(outcome.restored, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.attempted(), cookies.len());
    }

    #[tokio::test]
    async fn restore_counts_set_failures_without_aborting() {
        let jar = Arc::new(MemoryCookieJar::new());
        jar.fail_sets(true);
        let cookies = vec![
            cookie("a", "example.com", "0"),
            cookie("b", "example.com", "0"),
        ];

        let outcome = manager(&jar).restore(&cookies, "example.com").await.unwrap();
        assert_eq!(outcome.restored, 0);
        assert_eq!(outcome.failed, 2);
    }

    #[tokio::test]
    async fn restore_builds_expected_set_request() {
        let jar = Arc::new(MemoryCookieJar::new());
        let cookies = vec![Cookie {
            name: "sid".to_string(),
            value: "x".to_string(),
            domain: ".example.com".to_string(),
            path: "/foo".to_string(),
            secure: true,
            http_only: false,
            session: true,
            same_site: None,
            expiration_date: None,
            store_id: StoreId::new("0"),
        }];

        let outcome = manager(&jar).restore(&cookies, "example.com").await.unwrap();
        assert_eq!(outcome.restored, 1);

        let requests = jar.set_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://example.com/foo");
        assert_eq!(requests[0].domain.as_deref(), Some(".example.com"));
    }

    #[tokio::test]
    async fn host_only_cookies_get_no_explicit_domain() {
        let jar = Arc::new(MemoryCookieJar::new());
        let cookies = vec![cookie("a", "example.com", "0")];

        manager(&jar).restore(&cookies, "example.com").await.unwrap();
        assert_eq!(jar.set_requests()[0].domain, None);
    }

    #[tokio::test]
    async fn expiration_is_dropped_for_session_cookies() {
        let jar = Arc::new(MemoryCookieJar::new());
        let mut lived = cookie("keep", "example.com", "0");
        lived.session = false;
        lived.expiration_date = Some(1_900_000_000.0);
        let mut ephemeral = cookie("drop", "example.com", "0");
        ephemeral.session = true;
        ephemeral.expiration_date = Some(1_900_000_000.0);

        manager(&jar)
            .restore(&[lived, ephemeral], "example.com")
            .await
            .unwrap();

        let requests = jar.set_requests();
        let keep = requests.iter().find(|r| r.name == "keep").unwrap();
        let drop = requests.iter().find(|r| r.name == "drop").unwrap();
        assert_eq!(keep.expiration_date, Some(1_900_000_000.0));
        assert_eq!(drop.expiration_date, None);
    }

    #[tokio::test]
    async fn same_site_is_forwarded_only_when_explicit() {
        let jar = Arc::new(MemoryCookieJar::new());
        let mut lax = cookie("lax", "example.com", "0");
        lax.same_site = Some(SameSite::Lax);
        let mut unspecified = cookie("unspecified", "example.com", "0");
        unspecified.same_site = Some(SameSite::Unspecified);

        manager(&jar)
            .restore(&[lax, unspecified], "example.com")
            .await
            .unwrap();

        let requests = jar.set_requests();
        let lax = requests.iter().find(|r| r.name == "lax").unwrap();
        let unspecified = requests.iter().find(|r| r.name == "unspecified").unwrap();
        assert_eq!(lax.same_site, Some(SameSite::Lax));
        assert_eq!(unspecified.same_site, None);
    }

    #[test]
    fn url_construction_fails_without_any_domain() {
        let orphan = cookie("orphan", "", "0");

        let err = build_cookie_url(&orphan, "").unwrap_err();
        assert!(matches!(err, CookieError::NoUsableDomain { ref name, .. } if name == "orphan"));
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn url_construction_falls_back_to_target_domain() {
        let orphan = cookie("orphan", "", "0");

        let url = build_cookie_url(&orphan, "example.com").unwrap();
        assert_eq!(url, "http://example.com/");
    }

    #[test]
    fn url_path_defaults_to_root() {
        let mut c = cookie("a", "example.com", "0");
        c.path = String::new();
        assert_eq!(build_cookie_url(&c, "").unwrap(), "http://example.com/");
    }
}
