// src/commands/walk.rs
//! The time walk command

use crate::cli::Cli;
use anyhow::{Context, Result};
use console::Term;
use std::path::Path;
use std::sync::Arc;
use timewalk::install::clear_node_modules;
use timewalk::{
    ConsoleOutput, HttpRegistryClient, Level, NpmInstaller, Output, PackageInstaller,
    PackageManifest, RegistryClient, ResolverConfig, TemporalResolver, TimeWalker, WalkOptions,
    parse_cutoff,
};
use tracing::{debug, info};

/// Resolve and install the project's dependencies as of `--at`
pub fn cmd_walk(cli: &Cli) -> Result<()> {
    // Bad input is reported before any network or filesystem work
    let cutoff = parse_cutoff(&cli.at)?;

    let project_dir = Path::new(&cli.project_dir);
    let manifest = PackageManifest::load(project_dir)?;

    let mut config = ResolverConfig::from_env()?.with_concurrency(cli.concurrency);
    if let Some(registry) = &cli.registry {
        config = config.with_registry(registry)?;
    }
    info!(
        "Using registry {} with concurrency {}",
        config.registry, config.concurrency
    );

    let output: Arc<dyn Output> = Arc::new(ConsoleOutput::new(cli.color));
    // Pretend mode only prints the command, so a missing npm is fine there
    let npm = match NpmInstaller::locate(project_dir) {
        Ok(npm) => npm,
        Err(e) if cli.pretend => {
            debug!("{e}; printing the command anyway");
            NpmInstaller::with_program("npm", project_dir)
        }
        Err(e) => return Err(e).context("npm is required to install packages"),
    };
    let installer: Arc<dyn PackageInstaller> = Arc::new(npm);
    let client: Arc<dyn RegistryClient> = Arc::new(HttpRegistryClient::new(&config.registry)?);
    let resolver = Arc::new(TemporalResolver::with_client(client));

    let walker = TimeWalker::new(resolver.clone(), installer, output.clone(), config.concurrency)
        .with_progress_bar(Term::stderr().is_term());

    let options = WalkOptions {
        cutoff,
        include_dev: cli.dev,
        include_prod: cli.prod,
        pretend: cli.pretend,
        skip: cli.skip.clone(),
    };

    if !cli.pretend && !cli.keep_modules && clear_node_modules(project_dir)? {
        output.emit(Level::Info, "removed node_modules");
    }

    output.emit(
        Level::Notice,
        &format!("installing packages as at {}", cutoff.to_rfc3339()),
    );

    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcomes = rt.block_on(walker.run(&manifest, &options))?;

    let stats = resolver.time_index().stats();
    info!(
        "Walked {} groups; {} packuments fetched, {} cache hits, {} availability lookups",
        outcomes.len(),
        stats.fetches,
        stats.hits,
        resolver.prober().fetch_count()
    );

    Ok(())
}
