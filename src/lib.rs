// src/lib.rs

//! timewalk
//!
//! Installs a Node project's direct dependencies at the versions that
//! were current at a chosen moment in the past.
//!
//! # Architecture
//!
//! - Manifest: `package.json` dependency groups, in declaration order
//! - Registry: publish-time and installable-version lookups over HTTP
//! - Resolver: per-run caches, temporal selection, bounded batches
//! - Install: plan construction and the `npm install` subprocess
//! - Walk: dev group first, then prod, one install per group

pub mod config;
pub mod cutoff;
mod error;
pub mod install;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod walk;

pub use config::ResolverConfig;
pub use cutoff::parse_cutoff;
pub use error::{Error, Result};
pub use install::{InstallPlan, NpmInstaller, PackageInstaller, build_plan};
pub use manifest::{DependencyGroup, DependencySpec, PackageManifest};
pub use output::{ConsoleOutput, Level, MemoryOutput, Output, SilentOutput};
pub use progress::{CliProgress, LogProgress, ProgressTracker, SilentProgress};
pub use registry::{HttpRegistryClient, RegistryClient};
pub use resolver::{
    BatchCoordinator, BatchResolution, ResolutionResult, ResolvedVersion, TemporalResolver,
};
pub use walk::{GroupOutcome, TimeWalker, WalkOptions};
