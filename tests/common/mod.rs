// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tempfile::TempDir;
use timewalk::registry::RawPublishTimes;
use timewalk::{Error, InstallPlan, PackageInstaller, RegistryClient, Result};

/// Midnight UTC, `n` days after 2020-01-01
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// In-memory registry that counts every request
#[derive(Default)]
pub struct FakeRegistry {
    packages: HashMap<String, BTreeMap<String, DateTime<Utc>>>,
    withdrawn: HashSet<(String, String)>,
    failing: HashSet<String>,
    time_fetches: Mutex<HashMap<String, u64>>,
    version_fetches: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `versions` of `name`, each on the given day
    pub fn with_package(mut self, name: &str, versions: &[(&str, i64)]) -> Self {
        let times = versions
            .iter()
            .map(|(v, d)| (v.to_string(), day(*d)))
            .collect();
        self.packages.insert(name.to_string(), times);
        self
    }

    /// Listed in `time` but not installable
    pub fn with_withdrawn(mut self, name: &str, version: &str) -> Self {
        self.withdrawn.insert((name.to_string(), version.to_string()));
        self
    }

    /// Every request for `name` fails with a transport error
    pub fn with_failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Number of publish-time fetches made for one package
    pub fn time_fetches(&self, name: &str) -> u64 {
        self.time_fetches
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Total publish-time fetches across all packages
    pub fn total_time_fetches(&self) -> u64 {
        self.time_fetches.lock().unwrap().values().sum()
    }

    pub fn version_fetches(&self) -> u64 {
        self.version_fetches.load(Ordering::SeqCst)
    }

    /// Most publish-time fetches ever running at the same moment
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn publish_times_of(&self, package: &str) -> Result<RawPublishTimes> {
        if self.failing.contains(package) {
            return Err(Error::DownloadError(format!("{package}: connection reset")));
        }
        let times = self
            .packages
            .get(package)
            .ok_or_else(|| Error::NotFoundError(package.to_string()))?;

        let mut raw: RawPublishTimes = times
            .iter()
            .map(|(v, t)| (v.clone(), t.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .collect();
        if let Some(first) = times.values().min() {
            raw.insert("created".to_string(), first.to_rfc3339());
        }
        if let Some(last) = times.values().max() {
            raw.insert("modified".to_string(), last.to_rfc3339());
        }
        Ok(raw)
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn fetch_publish_times(&self, package: &str) -> Result<RawPublishTimes> {
        *self
            .time_fetches
            .lock()
            .unwrap()
            .entry(package.to_string())
            .or_default() += 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        // Give concurrent lookups a chance to overlap
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let result = self.publish_times_of(package);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn fetch_installable_versions(&self, package: &str) -> Result<Vec<String>> {
        self.version_fetches.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(package) {
            return Err(Error::DownloadError(format!("{package}: connection reset")));
        }
        let times = self
            .packages
            .get(package)
            .ok_or_else(|| Error::NotFoundError(package.to_string()))?;

        Ok(times
            .keys()
            .filter(|v| !self.withdrawn.contains(&(package.to_string(), v.to_string())))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Installer that records plans instead of running npm
#[derive(Default)]
pub struct RecordingInstaller {
    plans: Mutex<Vec<InstallPlan>>,
    fail_with: Option<String>,
}

impl RecordingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every install fails with the given stderr
    pub fn failing(stderr: &str) -> Self {
        Self {
            plans: Mutex::new(Vec::new()),
            fail_with: Some(stderr.to_string()),
        }
    }

    pub fn plans(&self) -> Vec<InstallPlan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    fn command_line(&self, plan: &InstallPlan) -> String {
        format!("npm {}", plan.install_args().join(" "))
    }

    async fn install(&self, plan: &InstallPlan) -> Result<()> {
        self.plans.lock().unwrap().push(plan.clone());
        match &self.fail_with {
            Some(stderr) => Err(Error::CommandFailed(stderr.clone())),
            None => Ok(()),
        }
    }
}

/// Scratch project directory holding a package.json
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn project_with_manifest(manifest: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), manifest).unwrap();
    dir
}
