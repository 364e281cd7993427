//! Package store backends
//!
//! The registry persists each package as one document keyed by name:
//! - **Memory**: process-local, for tests and throwaway servers
//! - **File**: one JSON document per package under a data directory
//! - **Sqlite**: a single-table document store
//!
//! Updates are whole-document replacements. Every stored document carries a
//! [`Revision`]; `replace_by_name` only succeeds when the caller's expected
//! revision is still current, so a push based on a stale read is rejected
//! instead of silently discarding a concurrent release.

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::{MemoryStore, OperationCounts};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use kshelf_core::Package;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult as Result};

/// Highest package id every backend can hold (SQLite rowids are signed)
pub const MAX_PACKAGE_ID: u64 = i64::MAX as u64;

/// Pick the id for a new document
///
/// A non-zero `requested` id is kept if it is in range and free. Zero asks for
/// the next id after the highest one in `existing`.
pub(crate) fn choose_id(requested: u64, existing: &[u64]) -> Result<u64> {
    if requested != 0 {
        if requested > MAX_PACKAGE_ID {
            return Err(StoreError::IdOutOfRange { id: requested });
        }
        if existing.contains(&requested) {
            return Err(StoreError::DuplicateId { id: requested });
        }
        return Ok(requested);
    }

    let highest = existing.iter().copied().max().unwrap_or(0);
    match highest.checked_add(1) {
        Some(next) if next <= MAX_PACKAGE_ID => Ok(next),
        _ => Err(StoreError::IdOutOfRange { id: highest }),
    }
}

/// Document revision, incremented on every replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
    /// Revision of a freshly inserted document
    pub const INITIAL: Revision = Revision(1);

    pub fn next(self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A package document together with its current revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPackage {
    pub revision: Revision,
    pub package: Package,
}

/// Persistence interface consumed by the registry service
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Find a package by its unique name
    async fn find_by_name(&self, name: &str) -> Result<StoredPackage>;

    /// All packages, ordered by name
    async fn find_all(&self) -> Result<Vec<Package>>;

    /// Insert a new package
    ///
    /// A package id of `0` is replaced by the next free id. Fails with
    /// `DuplicateKey` if the name is taken, `DuplicateId` if a non-zero id is
    /// taken, and `IdOutOfRange` above [`MAX_PACKAGE_ID`]. Nothing is stored on failure.
    async fn insert(&self, package: &Package) -> Result<StoredPackage>;

    /// Replace the whole document stored under `name`
    ///
    /// Fails with `Conflict` when the stored revision is no longer `expected`,
    /// and with `NotFound` when there is no such document. Returns the new revision.
    async fn replace_by_name(
        &self,
        name: &str,
        package: &Package,
        expected: Revision,
    ) -> Result<Revision>;

    /// Check if a package exists
    async fn exists(&self, name: &str) -> Result<bool> {
        match self.find_by_name(name).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
