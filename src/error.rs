//! Unified error type for history attribution.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur while querying git history.
#[derive(Error, Debug)]
pub enum AttribError {
    /// I/O error (commit-list file read, output write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `git` executable could not be started at all
    #[error("Failed to execute git: {source}. Is git installed and in PATH?")]
    GitSpawn {
        #[source]
        source: std::io::Error,
    },

    /// Path is not inside a git working tree
    #[error("Not inside a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// git exited non-zero for a command whose success was required
    #[error("git {command} failed: {message}")]
    CommandFailure { command: String, message: String },

    /// A commit-list line contains embedded whitespace
    #[error("Invalid commit list line {line}: commit hash must not contain spaces")]
    MalformedCommitList { line: usize },

    /// JSON rendering of results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}
