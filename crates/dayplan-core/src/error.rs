//! Core error types for dayplan-core.
//!
//! Every failure the core can surface maps onto one of four user-facing
//! classes (see [`ErrorClass`]); everything else is an internal fault.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Core error type for dayplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed input; prior state is left untouched.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The target task does not exist.
    #[error("Task {task_id} not found")]
    NotFound { task_id: TaskId },

    /// The target task exists but belongs to another user.
    #[error("Task {task_id} does not belong to the current user")]
    Unauthorized { task_id: TaskId },

    /// A collaborator (task store, suggestion source) could not be reached
    /// or answered with an error.
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The suggestion source answered with something that is not a usable
    /// task array.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// User-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFoundOrUnauthorized,
    UpstreamUnavailable,
    InvalidResponse,
    Internal,
}

impl CoreError {
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Validation,
            Self::NotFound { .. } | Self::Unauthorized { .. } => ErrorClass::NotFoundOrUnauthorized,
            Self::UpstreamUnavailable { .. } => ErrorClass::UpstreamUnavailable,
            Self::InvalidResponse(_) => ErrorClass::InvalidResponse,
            Self::Database(_) | Self::Config(_) | Self::Json(_) => ErrorClass::Internal,
        }
    }

    /// Only upstream failures get a retry affordance. The core never retries
    /// on its own.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::UpstreamUnavailable
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-separated key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Could not determine where configuration lives
    #[error("Could not resolve data directory: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Not a 24-hour `HH:MM` string
    #[error("Malformed time '{0}': expected HH:MM")]
    MalformedTime(String),

    /// Not a `YYYY-MM-DD` string
    #[error("Malformed date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    /// Required field missing or empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Task is not placed on the visible day
    #[error("Task {0} is not on the timeline")]
    NotOnTimeline(TaskId),

    /// Gesture events arrived out of order
    #[error("Gesture conflict: {0}")]
    GestureConflict(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
