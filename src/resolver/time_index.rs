// src/resolver/time_index.rs

//! Version time index
//!
//! Memoizes, per package, the mapping from version string to publish
//! time. Each package is fetched at most once per index; concurrent
//! lookups for the same name wait on the same in-flight fetch.

use crate::error::Error;
use crate::registry::RegistryClient;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Version (or tag-like key) → publish time
pub type PublishTimes = BTreeMap<String, DateTime<Utc>>;

type Slot = Arc<OnceCell<Arc<PublishTimes>>>;

/// Lookup statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Distinct packages seen
    pub entries: usize,
    /// Round-trips to the registry
    pub fetches: u64,
    /// Lookups served without a round-trip
    pub hits: u64,
}

/// Per-run cache of publish times
pub struct VersionTimeIndex {
    client: Arc<dyn RegistryClient>,
    slots: Mutex<HashMap<String, Slot>>,
    lookups: AtomicU64,
    fetches: AtomicU64,
}

impl VersionTimeIndex {
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self {
            client,
            slots: Mutex::new(HashMap::new()),
            lookups: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
        }
    }

    /// Publish times for a package
    ///
    /// Never fails: a registry error or unknown package gives an empty map.
    /// Keys are returned unfiltered, so `created`, `modified` and similar
    /// entries are still present.
    pub async fn publish_times(&self, package: &str) -> Arc<PublishTimes> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(package.to_string()).or_default().clone()
        };

        slot.get_or_init(|| self.fetch(package)).await.clone()
    }

    async fn fetch(&self, package: &str) -> Arc<PublishTimes> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let raw = match self.client.fetch_publish_times(package).await {
            Ok(raw) => raw,
            Err(Error::NotFoundError(msg)) => {
                debug!("{} is not in the {} registry: {}", package, self.client.name(), msg);
                return Arc::default();
            }
            Err(e) => {
                warn!(
                    "Could not fetch version times for {} from {} registry: {}",
                    package,
                    self.client.name(),
                    e
                );
                return Arc::default();
            }
        };

        let mut times = PublishTimes::new();
        for (key, stamp) in raw {
            match DateTime::parse_from_rfc3339(&stamp) {
                Ok(dt) => {
                    times.insert(key, dt.with_timezone(&Utc));
                }
                Err(e) => debug!("{}: ignoring '{}' with bad timestamp '{}': {}", package, key, stamp, e),
            }
        }

        Arc::new(times)
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.slots.lock().map(|s| s.len()).unwrap_or_default();
        let lookups = self.lookups.load(Ordering::Relaxed);
        let fetches = self.fetches.load(Ordering::Relaxed);
        CacheStats {
            entries,
            fetches,
            hits: lookups.saturating_sub(fetches),
        }
    }
}
