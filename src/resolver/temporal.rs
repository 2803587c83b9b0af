// src/resolver/temporal.rs

//! Temporal resolver
//!
//! Picks the version of a package that was current at a cutoff:
//! 1. Take every published version that satisfies the declared range and
//!    is not excluded, ordered by publish time.
//! 2. The candidate is the newest one published at or before the cutoff,
//!    or the oldest matching one when the cutoff predates them all.
//! 3. If the candidate turns out not to be installable it is excluded and
//!    selection repeats against the same (cached) publish times.

use super::availability::AvailabilityProber;
use super::time_index::{PublishTimes, VersionTimeIndex};
use super::{ResolutionResult, ResolvedVersion};
use crate::registry::RegistryClient;
use chrono::{DateTime, Utc};
use deno_semver::{Version, VersionReq};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Result of one selection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Version to probe next
    pub candidate: Option<String>,
    /// Newest matching version regardless of the cutoff
    pub latest: Option<String>,
}

/// A plain `major.minor.patch[-pre][+build]` key, as the registry writes
/// them. Publish-time maps also hold `created`, `modified` and the odd
/// hand-edited key (`v1.0.0`, `01.0.0`) that npm can't install.
static VERSION_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:0|[1-9]\d*)\.(?:0|[1-9]\d*)\.(?:0|[1-9]\d*)(?:-[0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*)?(?:\+[0-9A-Za-z\-]+(?:\.[0-9A-Za-z\-]+)*)?$",
    )
    .expect("version key pattern is valid")
});

/// Whether a publish-time key is an installable version string
fn is_version_key(key: &str) -> bool {
    VERSION_KEY.is_match(key)
}

/// Parse a declared range with npm semantics
///
/// An empty range means "any version", as in npm. Dist-tags (`latest`,
/// `next`) have no meaning at a past date and are rejected.
pub fn parse_range(declared: &str) -> Option<VersionReq> {
    let text = match declared.trim() {
        "" => "*",
        t => t,
    };

    let req = VersionReq::parse_from_npm(text).ok()?;
    if req.tag().is_some() {
        return None;
    }
    Some(req)
}

/// One selection pass over a package's publish times
pub fn select_candidate(
    times: &PublishTimes,
    range: &VersionReq,
    exclusions: &HashSet<String>,
    cutoff: DateTime<Utc>,
) -> Selection {
    let mut matching: Vec<(DateTime<Utc>, Version, &str)> = times
        .iter()
        .filter(|(key, _)| !exclusions.contains(key.as_str()))
        .filter(|(key, _)| is_version_key(key))
        .filter_map(|(key, published)| {
            Version::parse_from_npm(key)
                .ok()
                .map(|version| (*published, version, key.as_str()))
        })
        .filter(|(_, version, _)| range.matches(version))
        .collect();

    matching.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let candidate = matching
        .iter()
        .rev()
        .find(|(published, _, _)| *published <= cutoff)
        .or_else(|| matching.first())
        .map(|(_, _, key)| key.to_string());

    Selection {
        candidate,
        latest: matching.last().map(|(_, _, key)| key.to_string()),
    }
}

/// Resolves packages against a cutoff using shared per-run caches
pub struct TemporalResolver {
    index: Arc<VersionTimeIndex>,
    prober: Arc<AvailabilityProber>,
}

impl TemporalResolver {
    pub fn new(index: Arc<VersionTimeIndex>, prober: Arc<AvailabilityProber>) -> Self {
        Self { index, prober }
    }

    /// Resolver with fresh caches over one registry client
    pub fn with_client(client: Arc<dyn RegistryClient>) -> Self {
        Self::new(
            Arc::new(VersionTimeIndex::new(client.clone())),
            Arc::new(AvailabilityProber::new(client)),
        )
    }

    pub fn time_index(&self) -> &VersionTimeIndex {
        &self.index
    }

    pub fn prober(&self) -> &AvailabilityProber {
        &self.prober
    }

    /// Version of `package` current at `cutoff` within `declared_range`
    ///
    /// URL/VCS ranges must be filtered out by the caller.
    pub async fn resolve_at(
        &self,
        package: &str,
        declared_range: &str,
        cutoff: DateTime<Utc>,
    ) -> ResolutionResult {
        self.resolve_at_excluding(package, declared_range, cutoff, HashSet::new())
            .await
    }

    /// Same as [`resolve_at`](Self::resolve_at), starting from versions
    /// already known to be unavailable
    pub async fn resolve_at_excluding(
        &self,
        package: &str,
        declared_range: &str,
        cutoff: DateTime<Utc>,
        mut exclusions: HashSet<String>,
    ) -> ResolutionResult {
        let Some(range) = parse_range(declared_range) else {
            warn!(
                "{}: '{}' is not a semver range, leaving it to npm",
                package, declared_range
            );
            return ResolutionResult::unresolved(package);
        };

        let times = self.index.publish_times(package).await;

        loop {
            let selection = select_candidate(&times, &range, &exclusions, cutoff);

            let Some(candidate) = selection.candidate else {
                debug!("{}: nothing matches '{}'", package, declared_range);
                return ResolutionResult::unresolved(package);
            };

            if self.prober.is_available(package, &candidate).await {
                debug!("{}: '{}' resolved to {}", package, declared_range, candidate);
                return ResolutionResult {
                    name: package.to_string(),
                    resolved_version: ResolvedVersion::Version(candidate),
                    latest_matching_version: selection.latest.into(),
                };
            }

            debug!("{}@{} is not installable, trying the next one", package, candidate);
            exclusions.insert(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn times(entries: &[(&str, i64)]) -> PublishTimes {
        entries.iter().map(|(v, d)| (v.to_string(), day(*d))).collect()
    }

    fn select(t: &PublishTimes, range: &str, excluded: &[&str], cutoff: i64) -> Selection {
        let exclusions = excluded.iter().map(|s| s.to_string()).collect();
        select_candidate(t, &parse_range(range).unwrap(), &exclusions, day(cutoff))
    }

    #[test]
    fn test_latest_before_cutoff() {
        let t = times(&[("1.0.0", 0), ("1.1.0", 10), ("2.0.0", 20)]);
        let s = select(&t, "^1.0.0", &[], 15);
        assert_eq!(s.candidate.as_deref(), Some("1.1.0"));
        assert_eq!(s.latest.as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_cutoff_before_history_falls_back_to_earliest() {
        let t = times(&[("1.0.0", 10), ("1.1.0", 20)]);
        let s = select(&t, "^1.0.0", &[], 5);
        assert_eq!(s.candidate.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let t = times(&[("1.0.0", 0), ("1.1.0", 10)]);
        assert_eq!(select(&t, "^1", &[], 10).candidate.as_deref(), Some("1.1.0"));
    }

    #[test]
    fn test_ordering_is_by_publish_time_not_version() {
        // A 1.x backport published after 2.0.0
        let t = times(&[("1.0.0", 0), ("2.0.0", 10), ("1.0.1", 20)]);
        let s = select(&t, "*", &[], 15);
        assert_eq!(s.candidate.as_deref(), Some("2.0.0"));
        assert_eq!(s.latest.as_deref(), Some("1.0.1"));
    }

    #[test]
    fn test_same_timestamp_breaks_ties_by_version() {
        let t = times(&[("1.0.1", 5), ("1.0.0", 5)]);
        assert_eq!(select(&t, "^1", &[], 5).candidate.as_deref(), Some("1.0.1"));
    }

    #[test]
    fn test_non_versions_and_exclusions_are_skipped() {
        let t = times(&[("created", 0), ("modified", 30), ("1.0.0", 1), ("1.1.0", 2)]);
        let s = select(&t, "*", &["1.1.0"], 30);
        assert_eq!(s.candidate.as_deref(), Some("1.0.0"));
        assert_eq!(s.latest.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_loosely_formatted_keys_are_skipped() {
        let t = times(&[("1.0.0", 0), ("v1.1.0", 10), ("=1.2.0", 11), ("01.3.0", 12)]);
        let s = select(&t, "^1.0.0", &[], 15);
        assert_eq!(s.candidate.as_deref(), Some("1.0.0"));
        assert_eq!(s.latest.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_version_key_pattern() {
        assert!(is_version_key("1.0.0"));
        assert!(is_version_key("0.10.2-beta.1"));
        assert!(is_version_key("2.0.0-rc.1+build.5"));
        assert!(!is_version_key("v1.0.0"));
        assert!(!is_version_key(" 1.0.0"));
        assert!(!is_version_key("01.0.0"));
        assert!(!is_version_key("1.0"));
        assert!(!is_version_key("modified"));
    }

    #[test]
    fn test_prereleases_need_an_opt_in_range() {
        let t = times(&[("1.0.0", 0), ("1.1.0-beta.1", 5)]);
        assert_eq!(select(&t, "^1.0.0", &[], 10).candidate.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_npm_range_forms() {
        let t = times(&[("1.2.3", 0), ("1.2.9", 1), ("1.3.0", 2), ("2.0.0", 3)]);
        assert_eq!(select(&t, "~1.2.3", &[], 10).candidate.as_deref(), Some("1.2.9"));
        assert_eq!(select(&t, "1.2.x", &[], 10).candidate.as_deref(), Some("1.2.9"));
        assert_eq!(select(&t, ">=1.3.0 <2", &[], 10).candidate.as_deref(), Some("1.3.0"));
        assert_eq!(select(&t, "1.2.3 - 1.2.9", &[], 10).candidate.as_deref(), Some("1.2.9"));
        assert_eq!(select(&t, "1.2.3", &[], 10).candidate.as_deref(), Some("1.2.3"));
        assert_eq!(select(&t, "^1.2.3 || ^2", &[], 10).candidate.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_empty_selection() {
        let s = select(&PublishTimes::new(), "^1.0.0", &[], 10);
        assert_eq!(s, Selection::default());
    }

    #[test]
    fn test_parse_range() {
        assert!(parse_range("").is_some());
        assert!(parse_range("^4.17.0").is_some());
        assert!(parse_range("latest").is_none());
    }
}
