// src/walk.rs

//! Group-by-group time walk
//!
//! For each dependency group (dev first, then prod) the walker resolves
//! every registry dependency as of the cutoff, reports the unknowns and
//! the delta, builds the install plan and hands it to the installer. The
//! installer for a group only starts once every resolution of that group
//! has finished.

use crate::error::Result;
use crate::install::{InstallPlan, PackageInstaller, build_plan};
use crate::manifest::{DependencyGroup, DependencySpec, PackageManifest};
use crate::output::{Level, Output};
use crate::progress::{CliProgress, LogProgress, ProgressTracker};
use crate::resolver::{BatchCoordinator, BatchResolution, TemporalResolver};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// What to walk and how
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub cutoff: DateTime<Utc>,
    pub include_dev: bool,
    pub include_prod: bool,
    /// Print the npm command instead of running it
    pub pretend: bool,
    /// Packages left at whatever their declared range gives today
    pub skip: Vec<String>,
}

impl WalkOptions {
    pub fn new(cutoff: DateTime<Utc>) -> Self {
        Self {
            cutoff,
            include_dev: true,
            include_prod: true,
            pretend: false,
            skip: Vec::new(),
        }
    }

    /// Groups to process, in processing order
    pub fn groups(&self) -> Vec<DependencyGroup> {
        let mut groups = Vec::new();
        if self.include_dev {
            groups.push(DependencyGroup::Dev);
        }
        if self.include_prod {
            groups.push(DependencyGroup::Prod);
        }
        groups
    }
}

/// Result of walking one group
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    pub group: DependencyGroup,
    pub resolution: BatchResolution,
    pub plan: InstallPlan,
    /// Whether the installer actually ran
    pub installed: bool,
}

/// Drives resolution and installation for a project
pub struct TimeWalker {
    resolver: Arc<TemporalResolver>,
    installer: Arc<dyn PackageInstaller>,
    output: Arc<dyn Output>,
    concurrency: usize,
    show_progress: bool,
}

impl TimeWalker {
    pub fn new(
        resolver: Arc<TemporalResolver>,
        installer: Arc<dyn PackageInstaller>,
        output: Arc<dyn Output>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            installer,
            output,
            concurrency,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while each group resolves; otherwise
    /// progress goes to the log
    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Walk every selected group of `manifest`
    pub async fn run(
        &self,
        manifest: &PackageManifest,
        options: &WalkOptions,
    ) -> Result<Vec<GroupOutcome>> {
        let mut outcomes = Vec::new();
        for group in options.groups() {
            let outcome = self
                .run_group(
                    manifest.group(group),
                    group,
                    options.cutoff,
                    &options.skip,
                    options.pretend,
                )
                .await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Resolve and install a single group
    pub async fn run_group(
        &self,
        deps: &[DependencySpec],
        group: DependencyGroup,
        cutoff: DateTime<Utc>,
        skip: &[String],
        pretend: bool,
    ) -> Result<GroupOutcome> {
        self.output
            .emit(Level::Notice, &format!("querying {group} packages"));

        let skip: HashSet<&str> = skip.iter().map(String::as_str).collect();
        let (skipped, to_resolve): (Vec<&DependencySpec>, Vec<&DependencySpec>) =
            deps.iter().partition(|d| skip.contains(d.name.as_str()));
        let skipped: Vec<String> = skipped.into_iter().map(|d| d.name.clone()).collect();
        let to_resolve: Vec<DependencySpec> = to_resolve.into_iter().cloned().collect();

        if !skipped.is_empty() {
            debug!("Skipping {} {} packages: {}", skipped.len(), group, skipped.join(", "));
        }

        let progress: Arc<dyn ProgressTracker> = if self.show_progress {
            Arc::new(CliProgress::new(&format!("resolving {group} packages")))
        } else {
            Arc::new(LogProgress::new(format!("{group} packages")))
        };
        let coordinator =
            BatchCoordinator::new(self.resolver.clone(), self.concurrency, self.output.clone())
                .with_progress(progress.clone());

        let resolution = coordinator.resolve_all(&to_resolve, cutoff).await;
        progress.finish_with_message(&format!("{group} packages resolved"));
        coordinator.report(&resolution);

        let plan = build_plan(&resolution.resolutions, &skipped, &resolution.url_specifiers);
        let mut outcome = GroupOutcome {
            group,
            resolution,
            plan,
            installed: false,
        };

        if outcome.plan.is_empty() {
            self.output
                .emit(Level::Info, &format!("no {group} packages to install"));
            return Ok(outcome);
        }

        let command_line = self.installer.command_line(&outcome.plan);
        if pretend {
            self.output
                .emit(Level::Notice, &format!("would run: {command_line}"));
            return Ok(outcome);
        }

        self.output.emit(
            Level::Info,
            &format!(
                "installing {} {group} packages",
                outcome.resolution.delta.len()
            ),
        );
        info!("{}", command_line);
        self.installer.install(&outcome.plan).await?;
        self.output
            .emit(Level::Success, &format!("{group} packages installed"));

        outcome.installed = true;
        Ok(outcome)
    }
}
