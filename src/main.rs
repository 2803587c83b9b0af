// src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use timewalk::{ConsoleOutput, Level, Output};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the install plan
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::cmd_walk(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ConsoleOutput::new(cli.color).emit(Level::Error, &format!("error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
