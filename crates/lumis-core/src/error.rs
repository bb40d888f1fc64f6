//! Core error types for lumis-core.
//!
//! This module defines the error hierarchy used across the library,
//! built on thiserror. Library code propagates errors with `?`;
//! collaborator failures (shield bridge, notifications) are logged at
//! the call site instead of surfacing here.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lumis-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sync API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
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

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Sync API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error in a request or response body
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Credentials rejected and refresh did not recover
    #[error("Not authenticated")]
    Unauthorized,

    /// Non-success status from the backend
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// Token storage (keyring) failure
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Malformed base URL in sync configuration
    #[error("Invalid sync URL: {0}")]
    InvalidUrl(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Blocked-app limit reached on the free tier
    #[error("Free tier allows at most {limit} blocked apps")]
    BlockLimitReached { limit: usize },

    /// Referenced entity does not exist
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: String, id: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
