//! Error types for pressforge
//!
//! Library code returns `ForgeResult`; the binary wraps it in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pressforge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Main error type for pressforge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Two projects share the same shortname
    #[error("duplicate shortname '{shortname}' (used by '{first}' and '{second}')")]
    DuplicateShortname {
        shortname: String,
        first: String,
        second: String,
    },

    /// Requested task is not in the registry
    #[error("unknown task '{name}'")]
    UnknownTask { name: String },

    /// Task dependencies form a cycle
    #[error("dependency cycle detected at '{name}'")]
    DependencyCycle { name: String },

    /// A source file could not be transformed (minify, extract)
    #[error("failed to process {file}: {message}")]
    Transform { file: PathBuf, message: String },

    /// Zip archive could not be written
    #[error("failed to write archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Invalid exclusion or match pattern
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// File watcher could not be set up
    #[error("watch error: {0}")]
    Watch(String),

    /// Dev server failed to start or crashed
    #[error("dev server error: {0}")]
    Server(String),

    /// Operation skipped because a dependency failed
    #[error("skipped because '{dependency}' failed")]
    DependencyFailed { dependency: String },
}

impl From<notify::Error> for ForgeError {
    fn from(err: notify::Error) -> Self {
        ForgeError::Watch(err.to_string())
    }
}
