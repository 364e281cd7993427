//! Error types for client operations

use std::path::PathBuf;

use thiserror::Error;

/// Client operation errors
#[derive(Debug, Error)]
pub enum ClientError {
    // ============ Network Errors ============
    /// Non-success response; carries the raw status line and the server's message if any
    #[error("Server responded {status_text}{}", detail(.message.as_deref()))]
    HttpError {
        status: u16,
        status_text: String,
        message: Option<String>,
    },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid server URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    // ============ Local Cache Errors ============
    #[error("{action} {}: {source}", .path.display())]
    LocalIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No manifest files could be read from {}", .dir.display())]
    NothingToPush { dir: PathBuf },

    #[error("No *.yaml or *.json files to install in {}", .dir.display())]
    NothingToInstall { dir: PathBuf },

    // ============ Install Errors ============
    #[error("{failed} of {total} manifest(s) failed to apply")]
    InstallFailed { failed: usize, total: usize },

    // ============ Other ============
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failure of a single cluster apply
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}{}", detail(Some(.output.as_str())))]
    Failed {
        program: String,
        status: String,
        output: String,
    },
}

/// `": text"` suffix for error messages, empty when there is nothing to add
fn detail(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => format!(": {}", text),
        _ => String::new(),
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Request timeout used by the sync client
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

impl ClientError {
    /// Wrap an IO error with the path it happened on
    pub fn local_io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        ClientError::LocalIo {
            action,
            path: path.into(),
            source,
        }
    }

    /// HTTP status code, if this error came from a server response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout {
                seconds: REQUEST_TIMEOUT_SECS,
            }
        } else if e.is_connect() {
            ClientError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if e.is_decode() {
            ClientError::Serialization(e.to_string())
        } else {
            ClientError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::InvalidUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

impl From<kshelf_core::CoreError> for ClientError {
    fn from(e: kshelf_core::CoreError) -> Self {
        ClientError::InvalidPackage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let e = ClientError::HttpError {
            status: 404,
            status_text: "404 Not Found".to_string(),
            message: Some("package 'x' not found".to_string()),
        };
        assert_eq!(e.to_string(), "Server responded 404 Not Found: package 'x' not found");
        assert_eq!(e.status(), Some(404));

        let e = ClientError::HttpError {
            status: 502,
            status_text: "502 Bad Gateway".to_string(),
            message: None,
        };
        assert_eq!(e.to_string(), "Server responded 502 Bad Gateway");
    }

    #[test]
    fn test_local_io_display() {
        let e = ClientError::local_io(
            "Failed to create",
            "/tmp/kshelf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "Failed to create /tmp/kshelf: denied");
        assert_eq!(e.status(), None);
    }

    #[test]
    fn test_apply_error_display() {
        let e = ApplyError::Failed {
            program: "kubectl".to_string(),
            status: "exit status: 1".to_string(),
            output: "error: resource exists".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "kubectl exited with exit status: 1: error: resource exists"
        );

        let e = ApplyError::Failed {
            program: "kubectl".to_string(),
            status: "exit status: 1".to_string(),
            output: String::new(),
        };
        assert_eq!(e.to_string(), "kubectl exited with exit status: 1");

        let e = ClientError::InstallFailed { failed: 1, total: 3 };
        assert_eq!(e.to_string(), "1 of 3 manifest(s) failed to apply");
    }
}
