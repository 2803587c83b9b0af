// src/error.rs

//! Error types shared across the library

use thiserror::Error;

/// Errors produced by timewalk operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to set up a client, runtime or other component
    #[error("Initialization failed: {0}")]
    InitError(String),

    /// Filesystem or process I/O failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// Registry request failed or returned a non-success status
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Response or input could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Requested package does not exist in the registry
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// package.json is missing or is not valid JSON
    #[error("Can't read {path} as json: {reason}\n{raw}")]
    ManifestError {
        path: String,
        reason: String,
        raw: String,
    },

    /// The --at value is not a date or relative time we understand
    #[error("Invalid cutoff '{input}': {reason}")]
    InvalidCutoff { input: String, reason: String },

    /// A required executable is not on PATH
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// A subprocess exited with a non-zero status
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}
