//! Cookie selection, clearing, and restoration.
//!
//! [`CookieJar`] is the host boundary; [`CookieManager`] wraps it with
//! the domain-matching and batch policies of the session engine.

mod errors;
mod jar;
mod manager;
mod types;

pub use errors::CookieError;
pub use jar::CookieJar;
pub use manager::CookieManager;
pub use types::{Cookie, RestoreOutcome, SameSite, SetCookieRequest, StoreId};
