//! Server configuration
//!
//! Loaded from an optional YAML file, then overridden by command-line flags
//! and environment variables:
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 8080
//! store: sqlite
//! dataDir: /var/lib/kshelf
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConfigError, StoreResult};
use crate::store::{FileStore, MemoryStore, PackageStore, SqliteStore};

/// Which package store backend to run with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on restart
    Memory,
    /// One JSON document per package
    #[default]
    File,
    /// Single SQLite database file
    Sqlite,
}

/// Registry server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kshelf")
        .join("registry")
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured store backend
    pub fn open_store(&self) -> StoreResult<Arc<dyn PackageStore>> {
        let store: Arc<dyn PackageStore> = match self.store {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File => Arc::new(FileStore::new(self.data_dir.join("packages"))?),
            StoreBackend::Sqlite => {
                Arc::new(SqliteStore::open_at(&self.data_dir.join("registry.db"))?)
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kshelf_core::Package;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.store, StoreBackend::File);
        assert!(config.data_dir.ends_with("kshelf/registry"));
    }

    #[test]
    fn test_load_partial_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server.yaml");
        std::fs::write(&path, "port: 9090\nstore: sqlite\ndataDir: /srv/kshelf\n").unwrap();

        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("/srv/kshelf"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ServerConfig::load_from(Path::new("/nonexistent/server.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("server.yaml");
        std::fs::write(&path, "store: [not, a, backend]\n").unwrap();
        assert!(matches!(
            ServerConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_each_backend() {
        let tmp = TempDir::new().unwrap();
        for store in [StoreBackend::Memory, StoreBackend::File, StoreBackend::Sqlite] {
            let config = ServerConfig {
                store,
                data_dir: tmp.path().join(format!("{:?}", store)),
                ..Default::default()
            };
            let opened = config.open_store().unwrap();
            opened.insert(&Package::new("sample")).await.unwrap();
            assert!(opened.exists("sample").await.unwrap());
        }
    }
}
