//! Error types for rotalog.
//!
//! This module defines all error types used throughout the rotalog crate.
//! Validation and store availability are the two kinds a timeline caller is
//! expected to branch on; everything else is plumbing.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rotalog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A caller-supplied value was rejected before any state was touched.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    // === Storage Errors ===
    /// The timeline's backing store could not complete an operation.
    #[error("timeline store unavailable: {source}")]
    StoreUnavailable {
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Remote Errors ===
    /// A request to a remote timeline service failed in transport.
    #[error("timeline request failed: {0}")]
    Remote(#[from] reqwest::Error),

    /// A remote timeline service answered with a non-success status.
    #[error("timeline service returned {status}: {message}")]
    RemoteStatus {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the service.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rotalog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error for the named field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wrap a backing-store failure.
    #[must_use]
    pub fn store_unavailable(source: rusqlite::Error) -> Self {
        Self::StoreUnavailable { source }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a rejected input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means the timeline could not be reached.
    ///
    /// Remote transport failures count too: for a feed consumer the
    /// distinction between "server down" and "server's database down" is moot.
    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::Remote(_) | Self::RemoteStatus { status: 503, .. }
        )
    }
}
