//! Target-domain normalization and cookie-domain matching.
//!
//! A cookie belongs to a target domain when its normalized domain (leading
//! dot removed) equals the target, equals the `www.` variant of the
//! target, or is a plain suffix of the target.

/// Strip a `:port` suffix from a requested domain.
pub fn strip_port(domain: &str) -> &str {
    domain.split(':').next().unwrap_or(domain)
}

/// Strip the leading dot that marks a cookie as valid for subdomains.
pub fn strip_leading_dot(domain: &str) -> &str {
    domain.strip_prefix('.').unwrap_or(domain)
}

/// Decide whether a cookie scoped to `cookie_domain` belongs to `target`.
///
/// `target` must already be port-free (see [`strip_port`]). The suffix
/// rule is what makes a cookie set on `example.com` visible when the
/// target is `app.example.com`. It is a bare string-suffix test with no
/// label-boundary check, so a cookie for `b.com` also matches the
/// unrelated target `ab.com`.
pub fn cookie_matches_domain(cookie_domain: &str, target: &str) -> bool {
    let normalized = strip_leading_dot(cookie_domain);

    normalized == target
        || normalized
            .strip_prefix("www.")
            .map_or(false, |bare| bare == target)
        || target.ends_with(normalized)
}

/// Extract the host of a full page URL, e.g. to derive the session domain
/// of the active tab.
pub fn domain_from_url(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}
