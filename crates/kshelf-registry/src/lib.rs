//! kshelf Registry - server side of the Kubernetes manifest registry
//!
//! This crate provides:
//! - **Package stores**: memory, JSON-file and SQLite document backends
//! - **Registry service**: list/get/create/add-release with newest-first histories
//! - **HTTP API**: JSON routes served with axum
//!
//! Release additions are read-modify-write on a whole package document. The
//! store checks a per-document revision on write, so concurrent pushes to
//! the same package cannot silently overwrite each other.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod store;

pub use config::{ServerConfig, StoreBackend};
pub use error::{ApiErrorResponse, ConfigError, RegistryError, Result, StoreError};
pub use routes::{router, serve};
pub use service::RegistryService;
pub use store::{
    FileStore, MemoryStore, OperationCounts, PackageStore, Revision, SqliteStore, StoredPackage,
};
