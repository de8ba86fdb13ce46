//! Cookie-layer error types

use thiserror::Error;

use crate::AdapterError;

/// Cookie-layer errors.
///
/// Per-cookie problems inside a batch are counted, not raised; these
/// variants cover the failures that escape a batch.
#[derive(Error, Debug)]
pub enum CookieError {
    /// A restore was requested without a usable target domain.
    #[error("cookie restore requires a non-empty target domain")]
    EmptyRestoreDomain,

    /// Neither the cookie nor the caller supplied a domain to build a
    /// retrieval URL from.
    #[error("no usable domain for cookie {name:?} (cookie domain {domain:?})")]
    NoUsableDomain { name: String, domain: String },

    /// Cookie enumeration failed while preparing a clear operation.
    #[error("cookie listing failed for domain {domain}")]
    ListingFailed {
        domain: String,
        #[source]
        source: AdapterError,
    },
}
