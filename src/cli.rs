// src/cli.rs
//! CLI definitions for timewalk
//!
//! The command implementation lives in the `commands` module.

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "timewalk")]
#[command(version)]
#[command(about = "Install npm dependencies as they were at a point in time", long_about = None)]
pub struct Cli {
    /// Cutoff: a date ("2019-06-01", RFC 3339) or "N days/weeks/months/years ago"
    #[arg(long, value_name = "WHEN")]
    pub at: String,

    /// Leave devDependencies alone
    #[arg(long = "no-dev", action = ArgAction::SetFalse)]
    pub dev: bool,

    /// Leave dependencies alone
    #[arg(long = "no-prod", action = ArgAction::SetFalse)]
    pub prod: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetFalse)]
    pub color: bool,

    /// Show the npm command instead of running it
    #[arg(short, long)]
    pub pretend: bool,

    /// Project directory containing package.json
    #[arg(long = "where", value_name = "DIR", default_value = ".")]
    pub project_dir: String,

    /// Packages to install at their current version
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub skip: Vec<String>,

    /// Maximum number of packages resolved at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// npm registry base URL
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Don't remove node_modules before installing
    #[arg(long)]
    pub keep_modules: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
