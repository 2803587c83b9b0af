// src/resolver/mod.rs

//! Temporal version resolution
//!
//! Answers "which version of this package was current at the cutoff?"
//! for every dependency of a project:
//! - `time_index`: memoized version → publish time lookups
//! - `availability`: whether a listed version can really be installed
//! - `temporal`: per-package selection with retry-on-unavailable
//! - `batch`: bounded-concurrency resolution of a dependency group and
//!   the delta report shown to the user

mod availability;
mod batch;
mod temporal;
mod time_index;

pub use availability::AvailabilityProber;
pub use batch::{BatchCoordinator, BatchResolution, DeltaEntry};
pub use temporal::{Selection, TemporalResolver, parse_range, select_candidate};
pub use time_index::{CacheStats, PublishTimes, VersionTimeIndex};

use std::fmt;

/// Text shown wherever a version could not be determined
pub const UNRESOLVED: &str = "unresolved";

/// Outcome of resolving one package to a version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedVersion {
    Version(String),
    Unresolved,
}

impl ResolvedVersion {
    pub fn as_version(&self) -> Option<&str> {
        match self {
            Self::Version(v) => Some(v),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Version(_))
    }
}

impl From<Option<String>> for ResolvedVersion {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Unresolved, Self::Version)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(v) => write!(f, "{v}"),
            Self::Unresolved => write!(f, "{UNRESOLVED}"),
        }
    }
}

/// Resolution of a single package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub name: String,
    /// Version current at the cutoff
    pub resolved_version: ResolvedVersion,
    /// Newest version satisfying the declared range today
    pub latest_matching_version: ResolvedVersion,
}

impl ResolutionResult {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved_version: ResolvedVersion::Unresolved,
            latest_matching_version: ResolvedVersion::Unresolved,
        }
    }

    /// `name@version` install token, if resolved
    pub fn install_token(&self) -> Option<String> {
        self.resolved_version
            .as_version()
            .map(|v| format!("{}@{}", self.name, v))
    }
}
