// src/manifest.rs

//! Project manifest (package.json) loading
//!
//! Only the two dependency maps matter here. Each entry becomes a
//! [`DependencySpec`] whose declared range is either an npm semver range
//! or a URL/VCS locator that must never be time-walked.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// File name of the manifest inside a project directory
pub const MANIFEST_FILE: &str = "package.json";

/// Locators npm installs from somewhere other than the registry
static LOCATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?:
            [a-zA-Z][a-zA-Z0-9+.\-]*://      # any scheme, incl. git+https://
          | git@                             # scp-style git
          | (?:github|gitlab|bitbucket|gist|file|link):
          | \.{0,2}/                         # local path
          | [A-Za-z0-9][\w.\-]*/[\w.\-]+(?:\#.*)?$  # owner/repo shorthand
        )",
    )
    .expect("locator pattern is valid")
});

/// Returns true when a declared range points at a URL, VCS or local path
pub fn is_url_locator(declared: &str) -> bool {
    LOCATOR_PATTERN.is_match(declared.trim())
}

/// A single manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub declared_range: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, declared_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.into(),
        }
    }

    /// Whether this dependency bypasses temporal resolution
    pub fn is_url(&self) -> bool {
        is_url_locator(&self.declared_range)
    }
}

/// Which manifest map a dependency came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyGroup {
    Dev,
    Prod,
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

/// Raw shape of package.json; every other field is ignored
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    dependencies: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Dependencies declared by a project, in manifest order
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub dependencies: Vec<DependencySpec>,
    pub dev_dependencies: Vec<DependencySpec>,
}

impl PackageManifest {
    /// Read `package.json` from a project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(MANIFEST_FILE);
        debug!("Reading manifest from {}", path.display());

        let raw = std::fs::read_to_string(&path).map_err(|e| Error::ManifestError {
            path: path.display().to_string(),
            reason: e.to_string(),
            raw: String::new(),
        })?;

        Self::parse(&raw).map_err(|reason| Error::ManifestError {
            path: path.display().to_string(),
            reason,
            raw,
        })
    }

    /// Parse manifest content; the error is a bare reason string so the
    /// caller can attach the path and raw text
    fn parse(raw: &str) -> std::result::Result<Self, String> {
        let manifest: RawManifest = serde_json::from_str(raw).map_err(|e| e.to_string())?;

        Ok(Self {
            dependencies: to_specs(manifest.dependencies, "dependencies")?,
            dev_dependencies: to_specs(manifest.dev_dependencies, "devDependencies")?,
        })
    }

    /// Dependencies belonging to one group
    pub fn group(&self, group: DependencyGroup) -> &[DependencySpec] {
        match group {
            DependencyGroup::Dev => &self.dev_dependencies,
            DependencyGroup::Prod => &self.dependencies,
        }
    }
}

impl std::str::FromStr for PackageManifest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).map_err(|reason| Error::ManifestError {
            path: MANIFEST_FILE.to_string(),
            reason,
            raw: s.to_string(),
        })
    }
}

fn to_specs(
    map: Option<serde_json::Map<String, serde_json::Value>>,
    field: &str,
) -> std::result::Result<Vec<DependencySpec>, String> {
    let Some(map) = map else {
        return Ok(Vec::new());
    };

    map.into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(range) => Ok(DependencySpec::new(name, range)),
            other => Err(format!(
                "{field}.{name} must be a string, found {other}"
            )),
        })
        .collect()
}
