//! Client command workflows
//!
//! Each workflow combines the sync client, the local cache and, for install,
//! the cluster applier. One workflow call serves one CLI invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kshelf_core::{Package, Release, Results};

use crate::apply::{ApplyVerb, ClusterApplier, KubectlApplier};
use crate::cache::{LocalCache, SkippedFile};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::SyncClient;

/// Outcome of `get`
#[derive(Debug, Clone)]
pub struct GetReport {
    pub package: Package,
    /// Package directory in the local cache
    pub dir: PathBuf,
    /// Version written to the cache, `None` if the package has no releases
    pub version: Option<String>,
    pub written: Vec<PathBuf>,
    /// Manifest names refused because they were not plain file names
    pub rejected: Vec<String>,
}

/// Outcome of `push`
#[derive(Debug, Clone)]
pub struct PushReport {
    /// Package as returned by the registry after the push
    pub package: Package,
    pub version: String,
    /// Manifest names included in the release
    pub included: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

/// A manifest that failed to apply
#[derive(Debug, Clone)]
pub struct FailedApply {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of `install`
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub dir: PathBuf,
    /// Set when the package had to be fetched first
    pub fetched: Option<GetReport>,
    pub applied: Vec<PathBuf>,
    pub failed: Vec<FailedApply>,
}

impl InstallReport {
    pub fn total(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    /// Error if any manifest failed to apply
    pub fn ensure_success(&self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(ClientError::InstallFailed {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Client-side workflows for get/push/install/create/list
pub struct Workflow {
    client: SyncClient,
    cache: LocalCache,
    applier: Arc<dyn ClusterApplier>,
}

impl Workflow {
    pub fn new(client: SyncClient, cache: LocalCache, applier: Arc<dyn ClusterApplier>) -> Self {
        Self {
            client,
            cache,
            applier,
        }
    }

    /// Production wiring: HTTP client for `config.host`, cache at `config.home`, kubectl
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(
            SyncClient::new(&config.host)?,
            LocalCache::new(&config.home),
            Arc::new(KubectlApplier::new()),
        ))
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// List every package in the registry
    pub async fn list(&self) -> Result<Results> {
        self.client.list().await
    }

    /// Register a package from a local JSON definition
    pub async fn create(&self, path: &Path) -> Result<Package> {
        let package = self.client.create_package(path).await?;
        tracing::info!(name = %package.name, id = package.id, "Package created");
        Ok(package)
    }

    /// Fetch a package and write its newest release into the cache
    pub async fn get(&self, name: &str) -> Result<GetReport> {
        self.cache.ensure_home()?;
        let package = self.client.get(name).await?;

        let dir = self.cache.ensure_package_dir(name)?;
        let (version, written, rejected) = match package.latest_release() {
            Some(release) => {
                let result = self.cache.materialize(name, release)?;
                (Some(release.version.clone()), result.written, result.rejected)
            }
            None => (None, Vec::new(), Vec::new()),
        };

        tracing::debug!(name, ?version, files = written.len(), "Package fetched");
        Ok(GetReport {
            package,
            dir,
            version,
            written,
            rejected,
        })
    }

    /// Bundle the package directory as a new release and upload it
    pub async fn push(&self, name: &str, version: &str) -> Result<PushReport> {
        self.cache.ensure_home()?;
        let current = self.client.get(name).await?;

        let collected = self.cache.collect_manifests(name)?;
        if collected.manifests.is_empty() {
            return Err(ClientError::NothingToPush {
                dir: self.cache.package_dir(name)?,
            });
        }

        let included = collected.manifests.iter().map(|m| m.name.clone()).collect();
        let release = Release::for_push(
            version,
            current.author.clone(),
            current.id,
            collected.manifests,
        );
        let package = self.client.update(name, &release).await?;

        tracing::info!(name, version, "Release pushed");
        Ok(PushReport {
            package,
            version: version.to_string(),
            included,
            skipped: collected.skipped,
        })
    }

    /// Apply every `*.yaml` and `*.json` file of a cached package
    ///
    /// Fetches the package first when it is not cached. Every file is attempted;
    /// failures are collected in the report.
    pub async fn install(&self, name: &str, verb: ApplyVerb) -> Result<InstallReport> {
        self.cache.ensure_home()?;

        let fetched = if self.cache.has_package(name)? {
            None
        } else {
            Some(self.get(name).await?)
        };

        let dir = self.cache.package_dir(name)?;
        let files = self.cache.installable_files(name)?;
        if files.is_empty() {
            return Err(ClientError::NothingToInstall { dir });
        }

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for path in files {
            match self.applier.apply(&path, verb).await {
                Ok(()) => applied.push(path),
                Err(e) => {
                    tracing::debug!("Failed to apply {}: {}", path.display(), e);
                    failed.push(FailedApply {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(InstallReport {
            dir,
            fetched,
            applied,
            failed,
        })
    }
}
