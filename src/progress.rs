// src/progress.rs

//! Shared progress tracking trait and implementations
//!
//! Resolution of a dependency group reports progress through the
//! `ProgressTracker` trait. Implementations:
//! - `CliProgress`: indicatif progress bar on stderr
//! - `LogProgress`: logs progress to tracing
//! - `SilentProgress`: no-op for scripted/quiet modes and tests

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Core trait for progress tracking
///
/// Implementations must be thread-safe (Send + Sync) since updates arrive
/// from whichever resolution finishes next.
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Increment progress by the given amount
    fn increment(&self, amount: u64);

    /// Set the total (length) of the progress
    fn set_length(&self, length: u64);

    /// Finish progress successfully with a message
    fn finish_with_message(&self, message: &str);
}

/// Silent progress tracker (no-op)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, _amount: u64) {}

    fn set_length(&self, _length: u64) {}

    fn finish_with_message(&self, _message: &str) {}
}

/// Logging progress tracker
///
/// Logs progress updates to tracing at info level, roughly ten times over
/// the whole run.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
}

impl LogProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(0),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn increment(&self, amount: u64) {
        let old_pos = self.position.fetch_add(amount, Ordering::Relaxed);
        let new_pos = old_pos + amount;
        let length = self.length.load(Ordering::Relaxed);
        let interval = std::cmp::max(1, length / 10);

        if length > 0 && new_pos / interval > old_pos / interval {
            let percent = (new_pos * 100) / length;
            info!("{}: {}% ({}/{})", self.name, percent, new_pos, length);
        }
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }
}

/// Terminal progress bar
///
/// Draws to stderr and hides itself when stderr is not a terminal.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(operation: &str) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        // The template is a constant; fall back to the default style if it
        // is ever rejected
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg:<32!} ({pos}/{len}) [{bar:30.green/dim}]")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(operation.to_string());
        Self { bar }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
