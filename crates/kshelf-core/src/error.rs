//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid package name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid manifest name '{name}': {reason}")]
    InvalidManifestName { name: String, reason: String },

    #[error("Package '{name}' has no release ids left")]
    ReleaseIdsExhausted { name: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
