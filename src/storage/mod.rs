//! Page-storage extraction, injection, and clearing.
//!
//! [`PageExecutor`] and [`TabController`] are the host boundaries;
//! [`PageStorageAccessor`] runs the storage routines of the session
//! engine through them.

mod accessor;
mod errors;
mod page;
mod types;

pub use accessor::PageStorageAccessor;
pub use errors::StorageError;
pub use page::{PageExecutor, PageRoutine, TabController};
pub use types::StorageSnapshot;
