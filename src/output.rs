// src/output.rs

//! User-facing output
//!
//! Everything the tool says to the user goes through [`Output::emit`].
//! Implementations:
//! - `ConsoleOutput`: terminal output, optionally colored
//! - `SilentOutput`: no-op for scripted use
//! - `MemoryOutput`: records messages, for tests and embedding

use console::Style;
use std::fmt;
use std::sync::Mutex;

/// Severity/kind of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Plain progress narration
    Info,
    /// Something worth a second look (command lines, headings)
    Notice,
    /// A step completed
    Success,
    /// Non-fatal problem
    Warning,
    /// Fatal problem
    Error,
}

impl Level {
    fn style(self) -> Style {
        match self {
            Level::Info => Style::new(),
            Level::Notice => Style::new().cyan().bright(),
            Level::Success => Style::new().green().bright(),
            Level::Warning => Style::new().yellow().bright(),
            Level::Error => Style::new().red().bright(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Sink for user-facing messages
pub trait Output: Send + Sync {
    fn emit(&self, level: Level, text: &str);
}

/// Terminal output
///
/// Warnings and errors go to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    color: bool,
}

impl ConsoleOutput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn render(&self, level: Level, text: &str) -> String {
        if self.color {
            level.style().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Output for ConsoleOutput {
    fn emit(&self, level: Level, text: &str) {
        let rendered = self.render(level, text);
        match level {
            Level::Warning | Level::Error => eprintln!("{rendered}"),
            _ => println!("{rendered}"),
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

impl Output for SilentOutput {
    fn emit(&self, _level: Level, _text: &str) {}
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryOutput {
    messages: Mutex<Vec<(Level, String)>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in emission order
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at one level
    pub fn at_level(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text)
            .collect()
    }

    /// Whether any message contains the given text
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|(_, text)| text.contains(needle))
    }
}

impl Output for MemoryOutput {
    fn emit(&self, level: Level, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, text.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_is_unstyled() {
        let out = ConsoleOutput::plain();
        assert_eq!(out.render(Level::Error, "boom"), "boom");
    }

    #[test]
    fn test_memory_output() {
        let out = MemoryOutput::new();
        out.emit(Level::Info, "querying dev packages");
        out.emit(Level::Warning, "unknown: private-pkg");
        out.emit(Level::Info, "done");

        assert_eq!(out.messages().len(), 3);
        assert_eq!(out.at_level(Level::Warning), vec!["unknown: private-pkg"]);
        assert!(out.contains("dev packages"));
        assert!(!out.contains("prod packages"));
    }

    #[test]
    fn test_silent_output_accepts_everything() {
        let out: &dyn Output = &SilentOutput;
        out.emit(Level::Error, "ignored");
    }
}
