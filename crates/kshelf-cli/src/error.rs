//! CLI error types with exit code handling
//!
//! Client errors are grouped by what the user can do about them and rendered
//! through miette.

use kshelf_client::ClientError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The registry rejected the request or could not be reached
    #[error("{message}")]
    #[diagnostic(code(kshelf::cli::registry))]
    Registry {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Reading or writing the local cache failed
    #[error("{message}")]
    #[diagnostic(code(kshelf::cli::cache))]
    Cache {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Some manifests failed to apply
    #[error("Install failed: {failed} of {total} manifest(s) could not be applied")]
    #[diagnostic(
        code(kshelf::cli::install),
        help("Fix the failing manifests in the package directory and run install again")
    )]
    InstallFailed { failed: usize, total: usize },

    /// User provided invalid input
    #[error("{message}")]
    #[diagnostic(code(kshelf::cli::input))]
    Input { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(kshelf::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        exit_codes::ERROR
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::NetworkError { .. } | ClientError::Timeout { .. } => CliError::Registry {
                message,
                help: Some(
                    "Check that the registry is running, or point --host / KSHELF_URL at it"
                        .to_string(),
                ),
            },
            ClientError::HttpError { status: 404, .. } => CliError::Registry {
                message,
                help: Some("Run `kshelf list` to see the packages the registry knows".to_string()),
            },
            ClientError::HttpError { status: 409, .. } => CliError::Registry {
                message,
                help: Some("Fetch the package again and retry".to_string()),
            },
            ClientError::HttpError { .. } | ClientError::Serialization(_) => CliError::Registry {
                message,
                help: None,
            },
            ClientError::InvalidUrl { .. } => CliError::Input { message },
            ClientError::InvalidPackage(_) => CliError::Input { message },
            ClientError::NothingToPush { .. } => CliError::Cache {
                message,
                help: Some(
                    "Put the manifest files for the release in the package directory first"
                        .to_string(),
                ),
            },
            ClientError::NothingToInstall { .. } => CliError::Cache {
                message,
                help: Some("Run `kshelf get <package>` to fetch the latest release".to_string()),
            },
            ClientError::LocalIo { .. } => CliError::Cache {
                message,
                help: Some("Check the permissions of --homedir / KSHELF_HOME".to_string()),
            },
            ClientError::InstallFailed { failed, total } => {
                CliError::InstallFailed { failed, total }
            }
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_has_help() {
        let err = CliError::from(ClientError::NetworkError {
            message: "Connection failed".to_string(),
        });
        assert!(matches!(err, CliError::Registry { help: Some(_), .. }));
        assert_eq!(err.exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_status_text_is_kept() {
        let err = CliError::from(ClientError::HttpError {
            status: 404,
            status_text: "404 Not Found".to_string(),
            message: None,
        });
        assert_eq!(err.to_string(), "Server responded 404 Not Found");
    }

    #[test]
    fn test_install_failure_maps() {
        let err = CliError::from(ClientError::InstallFailed { failed: 2, total: 5 });
        assert_eq!(
            err.to_string(),
            "Install failed: 2 of 5 manifest(s) could not be applied"
        );
    }
}
