//! Result metadata for cache reads.

use chrono::{DateTime, Utc};

/// A page read together with where it was served from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
  /// When the data was fetched from the backend
  pub fetched_at: DateTime<Utc>,
}

impl<T> CacheResult<T> {
  /// Fresh network data, fetched just now.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      fetched_at: Utc::now(),
    }
  }

  /// Data served from the cache.
  pub fn from_cache(data: T, fetched_at: DateTime<Utc>, is_stale: bool) -> Self {
    Self {
      data,
      source: if is_stale {
        CacheSource::CacheStale
      } else {
        CacheSource::CacheFresh
      },
      fetched_at,
    }
  }

  pub fn is_stale(&self) -> bool {
    self.source == CacheSource::CacheStale
  }
}

/// Origin of a `CacheResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched by this read, or by the in-flight fetch it joined
  Network,
  /// Data from cache, still authoritative
  CacheFresh,
  /// Data from cache, invalidated or expired; only handed out by `peek`
  CacheStale,
}
