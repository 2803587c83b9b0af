// src/resolver/batch.rs

//! Batch resolution coordinator
//!
//! Resolves a whole dependency group with at most `concurrency`
//! resolutions in flight. Completion order is arbitrary, so results carry
//! their manifest position and are re-emitted in manifest order.

use super::temporal::TemporalResolver;
use super::{ResolutionResult, ResolvedVersion};
use crate::manifest::DependencySpec;
use crate::output::{Level, Output};
use crate::progress::{ProgressTracker, SilentProgress};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::debug;

/// A dependency whose resolved version differs from what the manifest says
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEntry {
    pub name: String,
    /// Declared range as written in the manifest
    pub from: String,
    /// Version current at the cutoff
    pub to: String,
    /// Newest version satisfying the range today
    pub latest: ResolvedVersion,
}

/// Everything known about a group after resolution
#[derive(Debug, Clone, Default)]
pub struct BatchResolution {
    /// One result per registry dependency, in manifest order
    pub resolutions: Vec<ResolutionResult>,
    /// URL/VCS dependencies, passed through untouched
    pub url_specifiers: Vec<DependencySpec>,
    /// Changes worth showing the user
    pub delta: Vec<DeltaEntry>,
    /// Registry dependencies no version could be found for
    pub unresolved: Vec<String>,
}

impl BatchResolution {
    /// Look up a result by package name
    pub fn get(&self, name: &str) -> Option<&ResolutionResult> {
        self.resolutions.iter().find(|r| r.name == name)
    }
}

/// Runs the temporal resolver over dependency groups
pub struct BatchCoordinator {
    resolver: Arc<TemporalResolver>,
    concurrency: usize,
    output: Arc<dyn Output>,
    progress: Arc<dyn ProgressTracker>,
}

impl BatchCoordinator {
    pub fn new(resolver: Arc<TemporalResolver>, concurrency: usize, output: Arc<dyn Output>) -> Self {
        Self {
            resolver,
            concurrency: concurrency.max(1),
            output,
            progress: Arc::new(SilentProgress::new()),
        }
    }

    /// Report per-package progress to a tracker
    pub fn with_progress(mut self, progress: Arc<dyn ProgressTracker>) -> Self {
        self.progress = progress;
        self
    }

    /// Resolve every dependency in `deps` as of `cutoff`
    pub async fn resolve_all(&self, deps: &[DependencySpec], cutoff: DateTime<Utc>) -> BatchResolution {
        let (url_specifiers, registry_deps): (Vec<_>, Vec<_>) =
            deps.iter().cloned().partition(|d| d.is_url());

        debug!(
            "Resolving {} packages ({} URL passthrough) with concurrency {}",
            registry_deps.len(),
            url_specifiers.len(),
            self.concurrency
        );

        self.progress.set_length(registry_deps.len() as u64);

        let resolver = &self.resolver;
        let progress = &self.progress;
        let mut indexed: Vec<(usize, ResolutionResult)> =
            stream::iter(registry_deps.iter().enumerate())
                .map(|(index, dep)| async move {
                    let result = resolver
                        .resolve_at(&dep.name, &dep.declared_range, cutoff)
                        .await;
                    progress.set_message(&dep.name);
                    progress.increment(1);
                    (index, result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        // Back to manifest order
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let resolutions: Vec<ResolutionResult> =
            indexed.into_iter().map(|(_, result)| result).collect();

        let delta = compute_delta(&registry_deps, &resolutions);
        let unresolved = resolutions
            .iter()
            .filter(|r| !r.resolved_version.is_resolved())
            .map(|r| r.name.clone())
            .collect();

        BatchResolution {
            resolutions,
            url_specifiers,
            delta,
            unresolved,
        }
    }

    /// Print the unknowns warning block and the delta
    pub fn report(&self, outcome: &BatchResolution) {
        if !outcome.unresolved.is_empty() {
            self.output.emit(
                Level::Warning,
                "Unable to determine versions for the following packages",
            );
            self.output.emit(
                Level::Warning,
                "(they may be private, or installed from a URL):",
            );
            for name in &outcome.unresolved {
                self.output.emit(Level::Warning, &format!("  {name}"));
            }
        }

        for entry in &outcome.delta {
            self.output.emit(
                Level::Info,
                &format!(
                    "  {}: {} -> {} (latest: {})",
                    entry.name, entry.from, entry.to, entry.latest
                ),
            );
        }
    }
}

/// Strip the operator npm writes in front of a pinned-ish range
fn declared_version(range: &str) -> &str {
    range
        .trim()
        .trim_start_matches(['^', '~', '=', 'v'])
        .trim_start()
}

/// Entries whose resolved version differs from the declared value
///
/// URL dependencies never reach this point and unresolved ones are
/// reported separately.
fn compute_delta(deps: &[DependencySpec], resolutions: &[ResolutionResult]) -> Vec<DeltaEntry> {
    deps.iter()
        .zip(resolutions)
        .filter_map(|(dep, result)| {
            let to = result.resolved_version.as_version()?;
            if declared_version(&dep.declared_range) == to {
                return None;
            }
            Some(DeltaEntry {
                name: dep.name.clone(),
                from: dep.declared_range.clone(),
                to: to.to_string(),
                latest: result.latest_matching_version.clone(),
            })
        })
        .collect()
}
