// # Request-Scoped Zone Cache
//
// Memoizes zone lookups by zone key for the lifetime of ONE request.
//
// ## Lifetime
//
// - Created by the executor when a request's fan-out starts
// - Shared by reference between the concurrent hostname updates
// - Dropped when the request completes; never stored globally
//
// ## Concurrency
//
// Each key owns a `OnceCell`. Concurrent first access to the same key
// performs a single upstream lookup; the other callers wait for it.
// A failed lookup leaves the cell empty so the error is not memoized.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;
use crate::traits::Zone;

/// Zone lookups memoized per request
#[derive(Debug, Default)]
pub struct ZoneCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Zone>>>>,
}

impl ZoneCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached zone for `key`, running `lookup` at most once
    ///
    /// # Parameters
    ///
    /// - `key`: zone key (registrable domain, or a fixed key for credential scope)
    /// - `lookup`: performs the upstream lookup on a miss
    pub async fn get_or_lookup<F, Fut>(&self, key: &str, lookup: F) -> Result<Zone>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Zone>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(key.to_string()).or_default())
        };

        cell.get_or_try_init(lookup).await.cloned()
    }

    /// Number of zones resolved so far
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    /// Check if nothing has been resolved yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
