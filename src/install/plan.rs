// src/install/plan.rs

//! Install plan construction
//!
//! The plan is the argument list handed to `npm install`, partitioned so
//! that a package name lands in exactly one group:
//! 1. `name@version` pins for resolved registry packages
//! 2. raw URL/VCS specifiers, installed as written
//! 3. bare names of skipped packages, so npm keeps them at whatever
//!    version the manifest range already allows

use crate::manifest::DependencySpec;
use crate::resolver::ResolutionResult;
use std::collections::HashSet;

/// Flags passed to every `npm install`
pub const INSTALL_FLAGS: [&str; 2] = ["--no-save", "--no-progress"];

/// Tokens for one install invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub pinned: Vec<String>,
    pub url_specifiers: Vec<String>,
    pub skipped: Vec<String>,
}

impl InstallPlan {
    /// Package tokens in install order
    pub fn tokens(&self) -> Vec<String> {
        self.pinned
            .iter()
            .chain(&self.url_specifiers)
            .chain(&self.skipped)
            .cloned()
            .collect()
    }

    /// Full npm argument list: sub-command, flags, then tokens
    pub fn install_args(&self) -> Vec<String> {
        std::iter::once("install".to_string())
            .chain(INSTALL_FLAGS.iter().map(|f| f.to_string()))
            .chain(self.tokens())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty() && self.url_specifiers.is_empty() && self.skipped.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.url_specifiers.len() + self.skipped.len()
    }
}

/// Build the plan for one dependency group
///
/// `skip_names` are re-added by bare name; callers pass only the skipped
/// names that belong to the group so npm is never asked to add a package
/// the manifest doesn't list. Unresolved packages are left out entirely.
pub fn build_plan(
    resolutions: &[ResolutionResult],
    skip_names: &[String],
    url_specifiers: &[DependencySpec],
) -> InstallPlan {
    let skip: HashSet<&str> = skip_names.iter().map(String::as_str).collect();

    let pinned = resolutions
        .iter()
        .filter(|r| !skip.contains(r.name.as_str()))
        .filter_map(ResolutionResult::install_token)
        .collect();

    let url_specifiers = url_specifiers
        .iter()
        .filter(|d| !skip.contains(d.name.as_str()))
        .map(|d| d.declared_range.clone())
        .collect();

    let mut seen = HashSet::new();
    let skipped = skip_names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect();

    InstallPlan {
        pinned,
        url_specifiers,
        skipped,
    }
}
