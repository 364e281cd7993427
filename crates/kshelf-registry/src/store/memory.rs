//! In-memory package store
//!
//! Documents live in a map guarded by a single lock, so every operation is
//! atomic with respect to the others. Useful for tests and for running a
//! throwaway registry.

use async_trait::async_trait;
use kshelf_core::Package;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{PackageStore, Revision, StoredPackage, choose_id};
use crate::error::{StoreError, StoreResult as Result};

/// In-memory package store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// name -> document
    documents: BTreeMap<String, StoredPackage>,
    operations: OperationCounts,
}

/// Counts of operations performed, for test assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub finds: usize,
    pub lists: usize,
    pub inserts: usize,
    pub replaces: usize,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated packages
    pub async fn with_packages(packages: Vec<Package>) -> Result<Self> {
        let store = Self::new();
        for package in packages {
            store.insert(&package).await?;
        }
        store.reset_counts().await;
        Ok(store)
    }

    /// Get operation counts for assertions
    pub async fn operation_counts(&self) -> OperationCounts {
        self.inner.read().await.operations.clone()
    }

    /// Reset operation counts
    pub async fn reset_counts(&self) {
        self.inner.write().await.operations = OperationCounts::default();
    }

    /// Count stored packages
    pub async fn package_count(&self) -> usize {
        self.inner.read().await.documents.len()
    }
}

#[async_trait]
impl PackageStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<StoredPackage> {
        let mut inner = self.inner.write().await;
        inner.operations.finds += 1;

        inner
            .documents
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    async fn find_all(&self) -> Result<Vec<Package>> {
        let mut inner = self.inner.write().await;
        inner.operations.lists += 1;

        Ok(inner
            .documents
            .values()
            .map(|doc| doc.package.clone())
            .collect())
    }

    async fn insert(&self, package: &Package) -> Result<StoredPackage> {
        let mut inner = self.inner.write().await;
        inner.operations.inserts += 1;

        if inner.documents.contains_key(&package.name) {
            return Err(StoreError::DuplicateKey {
                name: package.name.clone(),
            });
        }

        let ids: Vec<u64> = inner.documents.values().map(|doc| doc.package.id).collect();
        let mut package = package.clone();
        package.id = choose_id(package.id, &ids)?;

        let stored = StoredPackage {
            revision: Revision::INITIAL,
            package,
        };
        inner
            .documents
            .insert(stored.package.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn replace_by_name(
        &self,
        name: &str,
        package: &Package,
        expected: Revision,
    ) -> Result<Revision> {
        let mut inner = self.inner.write().await;
        inner.operations.replaces += 1;

        let doc = inner
            .documents
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })?;

        if doc.revision != expected {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                expected,
                actual: doc.revision,
            });
        }

        doc.revision = doc.revision.next();
        doc.package = package.clone();
        Ok(doc.revision)
    }
}
