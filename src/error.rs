//! Error types for the `fixd` front end.

use std::path::PathBuf;

use civic_core::CivicError;
use thiserror::Error;

/// Errors raised outside the engine: configuration, scripts, I/O.
#[derive(Error, Debug)]
pub enum FixdError {
    /// Engine command failed.
    #[error(transparent)]
    Civic(#[from] CivicError),

    // === Configuration Errors ===
    /// Configuration file could not be parsed.
    #[error("Invalid config file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// Configuration value is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),

    // === Script Errors ===
    /// A script line is not a valid command.
    #[error("Script parse error at line {line}: {reason}")]
    ScriptParse { line: usize, reason: String },

    /// Some commands in a script failed.
    #[error("{failed} of {total} script commands failed")]
    ScriptFailed { failed: usize, total: usize },

    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type using `FixdError`.
pub type Result<T> = std::result::Result<T, FixdError>;
