// src/config.rs

//! Resolver configuration
//!
//! Values come from built-in defaults, then the environment, then
//! explicit overrides (CLI flags), in that order of increasing priority.

use crate::error::{Error, Result};
use tracing::warn;
use url::Url;

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Upper bound on the default concurrency so the registry isn't hammered
pub const MAX_DEFAULT_CONCURRENCY: usize = 4;

/// Environment variable overriding the concurrency bound
pub const CONCURRENCY_ENV: &str = "TIMEWALK_CONCURRENCY";

/// Environment variable overriding the registry URL
pub const REGISTRY_ENV: &str = "TIMEWALK_REGISTRY";

/// Registry variable npm itself exports to lifecycle scripts
const NPM_REGISTRY_ENV: &str = "npm_config_registry";

/// Settings shared by every resolution in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum number of packages resolved at once
    pub concurrency: usize,
    /// Registry base URL, without trailing slash
    pub registry: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            registry: DEFAULT_REGISTRY.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CONCURRENCY_ENV) {
            match parse_concurrency(&raw) {
                Some(n) => config.concurrency = n,
                None => warn!(
                    "Ignoring {}={:?}: expected a positive integer",
                    CONCURRENCY_ENV, raw
                ),
            }
        }

        if let Some(registry) = lookup(REGISTRY_ENV).or_else(|| lookup(NPM_REGISTRY_ENV)) {
            config = config.with_registry(&registry)?;
        }

        Ok(config)
    }

    /// Override the concurrency bound; zero is ignored
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        if let Some(n) = concurrency.filter(|n| *n > 0) {
            self.concurrency = n;
        }
        self
    }

    /// Override the registry URL after validating it
    pub fn with_registry(mut self, registry: &str) -> Result<Self> {
        let parsed = Url::parse(registry.trim())
            .map_err(|e| Error::InitError(format!("Invalid registry URL '{registry}': {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InitError(format!(
                "Registry URL must be http or https, got '{registry}'"
            )));
        }

        self.registry = parsed.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }
}

/// min(available parallelism, 4)
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_CONCURRENCY)
}

fn parse_concurrency(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}
