//! Client configuration
//!
//! Resolved once per invocation from CLI flags, which fall back to
//! `KSHELF_URL` / `KSHELF_HOME` and then to the defaults below.

use std::path::PathBuf;

/// Registry used when neither `--host` nor `KSHELF_URL` is set
pub const DEFAULT_HOST: &str = "http://localhost:8080";

/// Directory name of the local cache under the user's home
pub const HOME_DIR_NAME: &str = ".kshelf";

/// Settings shared by every client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Registry base URL
    pub host: String,
    /// Local cache root; one subdirectory per package
    pub home: PathBuf,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            home: home.into(),
        }
    }

    /// Build a config, filling unset values with the defaults
    pub fn resolve(host: Option<String>, home: Option<PathBuf>) -> Self {
        Self {
            host: host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            home: home.unwrap_or_else(default_home),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

/// `$HOME/.kshelf`, or `./.kshelf` when the home directory is unknown
pub fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOME_DIR_NAME)
}
