//! Error types for `civic-core`.
//!
//! Every failure is reported synchronously and leaves the store untouched.

use std::fmt;

use thiserror::Error;

/// Primary error type for civic-core operations.
#[derive(Error, Debug)]
pub enum CivicError {
    // === Issue Errors ===
    /// Issue with the specified ID was not found.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: u64 },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {}", join_errors(errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Workflow Errors ===
    /// Privileged action without the flag, or voting/commenting without an identity.
    #[error("Unauthorized: {action}")]
    Unauthorized { action: String },

    /// Status value is not one of the recognized statuses.
    #[error("Invalid status transition: unrecognized status '{status}'")]
    InvalidTransition { status: String },

    // === Serialization Errors ===
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Coarse error classification for machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    InvalidTransition,
    Serialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::InvalidTransition => "invalid_transition",
            Self::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CivicError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IssueNotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } | Self::ValidationErrors { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Json(_) => ErrorKind::Serialization,
        }
    }
}

/// Result type using `CivicError`.
pub type Result<T> = std::result::Result<T, CivicError>;
