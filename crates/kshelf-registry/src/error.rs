//! Error types for kshelf-registry
//!
//! Store errors describe what happened to a document; registry errors are
//! what the HTTP layer reports. All API errors are returned as:
//!
//! ```json
//! {
//!   "error": "package 'team:widgets' not found",
//!   "code": "not_found",
//!   "timestamp": "2024-01-01T12:00:00Z"
//! }
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use kshelf_core::CoreError;
use serde::Serialize;
use thiserror::Error;

use crate::store::Revision;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised by package store backends
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("package '{name}' not found")]
    NotFound { name: String },

    #[error("package '{name}' already exists")]
    DuplicateKey { name: String },

    #[error("package id {id} is already in use")]
    DuplicateId { id: u64 },

    #[error("package id {id} is out of range")]
    IdOutOfRange { id: u64 },

    /// The document changed since it was read
    #[error(
        "package '{name}' was modified concurrently (expected revision {expected}, found {actual})"
    )]
    Conflict {
        name: String,
        expected: Revision,
        actual: Revision,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Errors returned by the registry service
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("package '{name}' not found")]
    NotFound { name: String },

    #[error("package '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("package id {id} is already in use")]
    IdInUse { id: u64 },

    #[error("package '{name}' was modified by another push, fetch it again and retry")]
    Conflict { name: String },

    #[error("invalid package: {0}")]
    InvalidPackage(String),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { name } => RegistryError::NotFound { name },
            StoreError::DuplicateKey { name } => RegistryError::AlreadyExists { name },
            StoreError::DuplicateId { id } => RegistryError::IdInUse { id },
            e @ StoreError::IdOutOfRange { .. } => RegistryError::InvalidPackage(e.to_string()),
            StoreError::Conflict { name, .. } => RegistryError::Conflict { name },
            other => RegistryError::Store(other),
        }
    }
}

impl From<CoreError> for RegistryError {
    fn from(e: CoreError) -> Self {
        RegistryError::InvalidPackage(e.to_string())
    }
}

impl From<JsonRejection> for RegistryError {
    fn from(rejection: JsonRejection) -> Self {
        RegistryError::InvalidPackage(rejection.body_text())
    }
}

impl RegistryError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotFound { .. } => "not_found",
            RegistryError::AlreadyExists { .. } => "already_exists",
            RegistryError::IdInUse { .. } => "id_in_use",
            RegistryError::Conflict { .. } => "conflict",
            RegistryError::InvalidPackage(_) => "invalid_package",
            RegistryError::Store(_) => "internal_error",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::AlreadyExists { .. }
            | RegistryError::IdInUse { .. }
            | RegistryError::Conflict { .. } => StatusCode::CONFLICT,
            RegistryError::InvalidPackage(_) => StatusCode::BAD_REQUEST,
            RegistryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: String,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = ApiErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Errors loading the server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
