//! Registry service: package lifecycle over a [`PackageStore`]

use chrono::{DateTime, Utc};
use kshelf_core::{Package, Release, Results};
use std::sync::Arc;

use crate::error::Result;
use crate::store::PackageStore;

/// Package list/get/create/add-release operations
///
/// The service is the only writer of release histories. Every mutation is a
/// read of the current document followed by a revision-checked replace.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn PackageStore>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn PackageStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn PackageStore> {
        &self.store
    }

    /// All packages with their full release histories
    pub async fn list(&self) -> Result<Results> {
        let packages = self.store.find_all().await?;
        tracing::debug!(count = packages.len(), "Listed packages");
        Ok(Results::from_packages(packages))
    }

    /// Get a package by name
    pub async fn get_by_name(&self, name: &str) -> Result<Package> {
        Ok(self.store.find_by_name(name).await?.package)
    }

    /// Register a new package
    ///
    /// The package is stored as given, apart from an id assigned by the store
    /// and creation/update timestamps filled in when the caller left them unset.
    pub async fn create(&self, mut package: Package) -> Result<Package> {
        Package::validate_name(&package.name)?;

        if is_unset(package.creation_date) {
            package.creation_date = Utc::now();
        }
        if is_unset(package.last_updated) {
            package.last_updated = package.creation_date;
        }

        let stored = self.store.insert(&package).await?;
        tracing::info!(
            package = %stored.package.name,
            id = stored.package.id,
            releases = stored.package.releases.len(),
            "Created package"
        );
        Ok(stored.package)
    }

    /// Prepend a release to a package's history
    ///
    /// The new release lands at index 0 of the document that was read. If
    /// another push replaced the document in between, the write is rejected
    /// with `Conflict` rather than dropping either release.
    pub async fn add_release(&self, name: &str, release: Release) -> Result<Package> {
        let stored = self.store.find_by_name(name).await?;
        let mut package = stored.package;

        let version = release.version.clone();
        let id = package.prepend_release(release, Utc::now())?.id;

        let revision = self
            .store
            .replace_by_name(name, &package, stored.revision)
            .await?;

        tracing::info!(
            package = %name,
            version = %version,
            release_id = id,
            revision = %revision,
            "Added release"
        );
        Ok(package)
    }
}

/// `0001-01-01T00:00:00Z`, the zero time written by Go clients
const GO_ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Whether a timestamp is a zero value rather than a real date
fn is_unset(date: DateTime<Utc>) -> bool {
    let secs = date.timestamp();
    date.timestamp_subsec_nanos() == 0 && (secs == 0 || secs == GO_ZERO_TIME_SECS)
}
