//! Synchronized page cache for the employee listing.
//!
//! This module keeps the last-known page windows coherent with the backend:
//! - Caches one window per page key, fetched through the API client
//! - Coalesces concurrent reads of the same key into a single request
//! - Invalidates every page after any successful write, since page
//!   membership is decided by the server
//! - Keeps stale windows around for display while a refetch is pending

mod key;
mod layer;
mod traits;

pub use key::{Invalidation, PageKey};
pub use layer::PageCache;
pub use traits::{CacheResult, CacheSource};
