//! Local package cache
//!
//! Layout: `<home>/<package-name>/<manifest-file>`. The directory for a package
//! mirrors the release most recently fetched, plus whatever the user edited
//! before pushing. A single client process owns it at a time; nothing is locked.

use std::path::{Path, PathBuf};

use glob::Pattern;
use kshelf_core::{Manifest, Package, Release};
use walkdir::WalkDir;

use crate::error::{ClientError, Result};

/// Extensions picked up by `install`, in apply order
const INSTALL_EXTENSIONS: &[&str] = &["yaml", "json"];

/// Client-side manifest directory tree
#[derive(Debug, Clone)]
pub struct LocalCache {
    home: PathBuf,
}

/// Result of writing a release into the cache
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    /// Files written, in release order
    pub written: Vec<PathBuf>,
    /// Manifest names refused because they would escape the package directory
    pub rejected: Vec<String>,
}

/// A file left out of a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Manifests read from a package directory
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub manifests: Vec<Manifest>,
    pub skipped: Vec<SkippedFile>,
}

impl LocalCache {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Cache root
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Create the cache root if it does not exist yet
    pub fn ensure_home(&self) -> Result<()> {
        if self.home.is_dir() {
            return Ok(());
        }
        tracing::debug!(home = %self.home.display(), "Creating cache home");
        std::fs::create_dir_all(&self.home)
            .map_err(|e| ClientError::local_io("Failed to create", &self.home, e))
    }

    /// Directory holding a package's manifests
    pub fn package_dir(&self, name: &str) -> Result<PathBuf> {
        Package::validate_name(name)?;
        Ok(self.home.join(name))
    }

    /// Whether the package directory is present
    pub fn has_package(&self, name: &str) -> Result<bool> {
        Ok(self.package_dir(name)?.is_dir())
    }

    /// Create the package directory, returning its path
    pub fn ensure_package_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.package_dir(name)?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| ClientError::local_io("Failed to create", &dir, e))?;
        Ok(dir)
    }

    /// Write a release's manifests into the package directory
    ///
    /// Existing files with the same name are overwritten, other files are left alone.
    pub fn materialize(&self, name: &str, release: &Release) -> Result<Materialized> {
        let dir = self.ensure_package_dir(name)?;
        let mut result = Materialized::default();

        for manifest in &release.manifests {
            if let Err(e) = manifest.validate_name() {
                tracing::debug!("Not writing manifest: {}", e);
                result.rejected.push(manifest.name.clone());
                continue;
            }

            let path = dir.join(&manifest.name);
            std::fs::write(&path, &manifest.data)
                .map_err(|e| ClientError::local_io("Failed to write", &path, e))?;
            result.written.push(path);
        }

        Ok(result)
    }

    /// Read every regular file directly under the package directory
    ///
    /// Files come back sorted by name. Files that cannot be read as UTF-8 text
    /// are skipped with a warning rather than failing the whole collection.
    pub fn collect_manifests(&self, name: &str) -> Result<Collected> {
        let dir = self.package_dir(name)?;
        let mut collected = Collected::default();

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ClientError::local_io("Failed to read", &dir, e.into()));
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    collected.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match std::fs::read_to_string(entry.path()) {
                Ok(data) => {
                    let file_name = entry.file_name().to_string_lossy().into_owned();
                    collected.manifests.push(Manifest::new(file_name, data));
                }
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    collected.skipped.push(SkippedFile {
                        path: entry.path().to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(collected)
    }

    /// Files `install` should apply: `*.yaml` then `*.json`, each group sorted
    pub fn installable_files(&self, name: &str) -> Result<Vec<PathBuf>> {
        let dir = self.package_dir(name)?;
        let escaped = Pattern::escape(&dir.to_string_lossy());
        let mut files = Vec::new();

        for ext in INSTALL_EXTENSIONS {
            let pattern = format!("{}/*.{}", escaped, ext);
            let paths = glob::glob(&pattern).map_err(|e| {
                ClientError::local_io("Failed to scan", &dir, std::io::Error::other(e))
            })?;

            for path in paths {
                let path = path.map_err(|e| {
                    let path = e.path().to_path_buf();
                    ClientError::local_io("Failed to scan", path, e.into_error())
                })?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }
}
