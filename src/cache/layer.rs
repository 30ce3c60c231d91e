//! Cache layer that orchestrates page caching with network fetching.

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, trace};

use crate::api::{ApiResult, Employee, EmployeeApi, EmployeeId, PageWindow};

use super::key::{Invalidation, PageKey};
use super::traits::CacheResult;

type SharedFetch = Shared<BoxFuture<'static, ApiResult<PageWindow<Employee>>>>;

#[derive(Default)]
struct Entry {
  window: Option<PageWindow<Employee>>,
  fetched_at: Option<DateTime<Utc>>,
  stale: bool,
  /// Bumped by every invalidation; fetches started under an older
  /// generation never write their result back
  generation: u64,
  in_flight: Option<SharedFetch>,
}

type Entries = Arc<Mutex<HashMap<PageKey, Entry>>>;

/// Page cache that sits between the controller and the API client.
///
/// Entries are only ever changed through `read`, `invalidate` and the
/// `apply_*` hooks. Cloning is cheap and clones share state.
pub struct PageCache {
  api: Arc<dyn EmployeeApi>,
  entries: Entries,
  /// How long before a fetched window is considered stale; `None` means
  /// only invalidation makes it stale
  stale_time: Option<Duration>,
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<PageKey, Entry>> {
  // Entries are left consistent at every unlock, so a poisoned lock is still usable
  entries.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PageCache {
  pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
    Self {
      api,
      entries: Arc::new(Mutex::new(HashMap::new())),
      stale_time: None,
    }
  }

  /// Set a freshness horizon for cached windows.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = Some(stale_time);
    self
  }

  fn is_expired(&self, fetched_at: DateTime<Utc>) -> bool {
    self
      .stale_time
      .is_some_and(|stale_time| Utc::now() - fetched_at >= stale_time)
  }

  /// Read a page, fetching it when missing or stale.
  ///
  /// Concurrent reads of the same key share one request. A read issued after
  /// an invalidation never joins a fetch that started before it.
  pub async fn read(&self, key: PageKey) -> ApiResult<CacheResult<PageWindow<Employee>>> {
    let fetch = {
      let mut entries = lock(&self.entries);
      let entry = entries.entry(key).or_default();

      if let (Some(window), Some(fetched_at)) = (&entry.window, entry.fetched_at) {
        if !entry.stale && !self.is_expired(fetched_at) {
          trace!(%key, "page cache hit");
          return Ok(CacheResult::from_cache(window.clone(), fetched_at, false));
        }
      }

      match &entry.in_flight {
        Some(fetch) => {
          debug!(%key, "joining in-flight page fetch");
          fetch.clone()
        }
        None => {
          debug!(%key, generation = entry.generation, "fetching page");
          let fetch = self.start_fetch(key, entry.generation);
          entry.in_flight = Some(fetch.clone());
          fetch
        }
      }
    };

    let window = fetch.await?;
    Ok(CacheResult::from_network(window))
  }

  fn start_fetch(&self, key: PageKey, generation: u64) -> SharedFetch {
    let api = Arc::clone(&self.api);
    let entries = Arc::clone(&self.entries);

    async move {
      let result = api.list_page(key).await;

      let mut guard = lock(&entries);
      match guard.get_mut(&key) {
        Some(entry) if entry.generation == generation => {
          entry.in_flight = None;
          if let Ok(window) = &result {
            entry.window = Some(window.clone());
            entry.fetched_at = Some(Utc::now());
            entry.stale = false;
          }
        }
        _ => debug!(%key, generation, "discarding page fetch superseded by invalidation"),
      }

      result
    }
    .boxed()
    .shared()
  }

  /// Last known window for a key, stale or not. Never fetches.
  pub fn peek(&self, key: PageKey) -> Option<CacheResult<PageWindow<Employee>>> {
    let entries = lock(&self.entries);
    let entry = entries.get(&key)?;
    let window = entry.window.clone()?;
    let fetched_at = entry.fetched_at?;
    let stale = entry.stale || self.is_expired(fetched_at);
    Some(CacheResult::from_cache(window, fetched_at, stale))
  }

  /// Mark matching entries stale without evicting them.
  ///
  /// In-flight fetches for those entries are detached: callers already
  /// waiting on them still get their result, but it is not stored.
  pub fn invalidate(&self, scope: Invalidation) {
    let mut entries = lock(&self.entries);
    let mut count = 0;
    for (key, entry) in entries.iter_mut().filter(|(key, _)| scope.matches(key)) {
      entry.stale = true;
      entry.generation += 1;
      entry.in_flight = None;
      count += 1;
      trace!(%key, generation = entry.generation, "invalidated page");
    }
    debug!(?scope, count, "page cache invalidated");
  }

  /// Invalidate one page and read it again.
  #[allow(dead_code)]
  pub async fn refresh(&self, key: PageKey) -> ApiResult<CacheResult<PageWindow<Employee>>> {
    self.invalidate(Invalidation::Page(key.page()));
    self.read(key).await
  }

  /// Record a successful create.
  ///
  /// The new record's page is decided by the server, so every page is
  /// invalidated rather than patched.
  pub fn apply_create(&self, created: &Employee) {
    info!(id = created.id, "employee created, invalidating all pages");
    self.invalidate(Invalidation::All);
  }

  /// Record a successful update.
  pub fn apply_update(&self, updated: &Employee) {
    info!(id = updated.id, "employee updated, invalidating all pages");
    self.invalidate(Invalidation::All);
  }

  /// Record a successful delete.
  pub fn apply_delete(&self, id: EmployeeId) {
    info!(id, "employee deleted, invalidating all pages");
    self.invalidate(Invalidation::All);
  }
}

impl Clone for PageCache {
  fn clone(&self) -> Self {
    Self {
      api: Arc::clone(&self.api),
      entries: Arc::clone(&self.entries),
      stale_time: self.stale_time,
    }
  }
}
