// src/registry/mod.rs

//! npm registry access
//!
//! The [`RegistryClient`] trait is the only seam between the resolver and
//! the network. Production code uses [`HttpRegistryClient`]; tests plug in
//! an in-memory implementation.

mod http;
mod packument;

pub use http::HttpRegistryClient;
pub use packument::{AbbreviatedPackument, Packument};

use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Raw `time` map of a package: version or tag → ISO 8601 timestamp
pub type RawPublishTimes = BTreeMap<String, String>;

/// Source of package metadata
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch the publish time of every version (and tag-like keys such as
    /// `created` and `modified`)
    async fn fetch_publish_times(&self, package: &str) -> Result<RawPublishTimes>;

    /// Fetch the versions the registry will actually serve for install
    async fn fetch_installable_versions(&self, package: &str) -> Result<Vec<String>>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Encode a package name for use as a registry path segment
///
/// Scoped names keep their `@` but the separating slash is escaped.
pub fn encode_package_name(package: &str) -> String {
    package.replace('/', "%2F")
}
