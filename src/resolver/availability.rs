// src/resolver/availability.rs

//! Availability prober
//!
//! A version can have a publish time and still be impossible to install
//! (unpublished, or hidden by a proxy). The prober checks the registry's
//! installable version list. When that list cannot be fetched the version
//! is assumed available: private packages would otherwise never resolve,
//! and npm reports the real error if the guess is wrong.

use crate::manifest::is_url_locator;
use crate::registry::RegistryClient;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

/// `None` means the list could not be determined
type Listing = Option<Arc<HashSet<String>>>;

/// Per-run cache of installable versions
pub struct AvailabilityProber {
    client: Arc<dyn RegistryClient>,
    slots: Mutex<HashMap<String, Arc<OnceCell<Listing>>>>,
    fetches: AtomicU64,
}

impl AvailabilityProber {
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self {
            client,
            slots: Mutex::new(HashMap::new()),
            fetches: AtomicU64::new(0),
        }
    }

    /// Whether `package@version` can be installed
    pub async fn is_available(&self, package: &str, version: &str) -> bool {
        if is_url_locator(version) {
            return true;
        }

        match self.listing(package).await {
            Some(versions) => versions.contains(version),
            None => true,
        }
    }

    async fn listing(&self, package: &str) -> Listing {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(package.to_string()).or_default().clone()
        };

        slot.get_or_init(|| async {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            match self.client.fetch_installable_versions(package).await {
                Ok(versions) => Some(Arc::new(versions.into_iter().collect())),
                Err(e) => {
                    debug!("Assuming {} versions are available: {}", package, e);
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Number of registry round-trips made so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::registry::RawPublishTimes;
    use async_trait::async_trait;

    struct ListingRegistry {
        versions: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl RegistryClient for ListingRegistry {
        async fn fetch_publish_times(&self, _package: &str) -> Result<RawPublishTimes> {
            Ok(RawPublishTimes::new())
        }

        async fn fetch_installable_versions(&self, package: &str) -> Result<Vec<String>> {
            match &self.versions {
                Some(v) => Ok(v.iter().map(|s| s.to_string()).collect()),
                None => Err(Error::DownloadError(format!("403 for {package}"))),
            }
        }

        fn name(&self) -> &str {
            "listing"
        }
    }

    #[tokio::test]
    async fn test_membership() {
        let prober = AvailabilityProber::new(Arc::new(ListingRegistry {
            versions: Some(vec!["1.0.0", "1.2.0"]),
        }));

        assert!(prober.is_available("x", "1.0.0").await);
        assert!(!prober.is_available("x", "1.1.0").await);
        assert!(prober.is_available("x", "1.2.0").await);
        assert_eq!(prober.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_assumes_available() {
        let prober = AvailabilityProber::new(Arc::new(ListingRegistry { versions: None }));

        assert!(prober.is_available("private", "9.9.9").await);
        assert!(prober.is_available("private", "1.0.0").await);
        assert_eq!(prober.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_url_versions_skip_the_registry() {
        let prober = AvailabilityProber::new(Arc::new(ListingRegistry {
            versions: Some(Vec::new()),
        }));

        assert!(
            prober
                .is_available("y", "git+https://example.com/y.git")
                .await
        );
        assert_eq!(prober.fetch_count(), 0);
    }
}
