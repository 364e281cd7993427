//! File-based package store
//!
//! Stores one JSON document per package in a data directory. Useful for:
//! - Single-node registries that should survive restarts
//! - Inspecting or backing up the registry with ordinary tools

use async_trait::async_trait;
use kshelf_core::Package;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{PackageStore, Revision, StoredPackage, choose_id};
use crate::error::{StoreError, StoreResult as Result};

/// File-based package store
pub struct FileStore {
    /// Directory holding one `<encoded-name>.json` per package
    base_dir: PathBuf,
    /// Serializes read-check-write sequences within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a new file store
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        // Create base directory if it doesn't exist
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the directory this store writes to
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path for a package document
    ///
    /// Names are percent-encoded so that characters such as `:` are safe on every platform.
    fn document_path(&self, name: &str) -> PathBuf {
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        self.base_dir.join(format!("{}.json", encoded))
    }

    fn read_document(&self, path: &Path) -> Result<StoredPackage> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Write through a temporary file so readers never see a partial document
    fn write_document(&self, stored: &StoredPackage) -> Result<()> {
        let path = self.document_path(&stored.package.name);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(stored)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn load(&self, name: &str) -> Result<StoredPackage> {
        let path = self.document_path(name);

        if !path.exists() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }

        self.read_document(&path)
    }

    fn load_all(&self) -> Result<Vec<StoredPackage>> {
        let mut documents: Vec<StoredPackage> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .filter_map(|p| match self.read_document(&p) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!(
                        path = %p.display(),
                        error = %e,
                        "Skipping unreadable package document"
                    );
                    None
                }
            })
            .collect();

        documents.sort_by(|a, b| a.package.name.cmp(&b.package.name));
        Ok(documents)
    }
}

#[async_trait]
impl PackageStore for FileStore {
    async fn find_by_name(&self, name: &str) -> Result<StoredPackage> {
        self.load(name)
    }

    async fn find_all(&self) -> Result<Vec<Package>> {
        Ok(self.load_all()?.into_iter().map(|doc| doc.package).collect())
    }

    async fn insert(&self, package: &Package) -> Result<StoredPackage> {
        let _guard = self.write_lock.lock().await;

        if self.document_path(&package.name).exists() {
            return Err(StoreError::DuplicateKey {
                name: package.name.clone(),
            });
        }

        let ids: Vec<u64> = self.load_all()?.iter().map(|doc| doc.package.id).collect();
        let mut package = package.clone();
        package.id = choose_id(package.id, &ids)?;

        let stored = StoredPackage {
            revision: Revision::INITIAL,
            package,
        };
        self.write_document(&stored)?;
        Ok(stored)
    }

    async fn replace_by_name(
        &self,
        name: &str,
        package: &Package,
        expected: Revision,
    ) -> Result<Revision> {
        let _guard = self.write_lock.lock().await;

        let current = self.load(name)?;
        if current.revision != expected {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                expected,
                actual: current.revision,
            });
        }

        let mut package = package.clone();
        package.name = name.to_string();
        let stored = StoredPackage {
            revision: current.revision.next(),
            package,
        };
        self.write_document(&stored)?;
        Ok(stored.revision)
    }
}
