//! Sync client for the registry HTTP API
//!
//! Every call is a single request/response; nothing here touches the local cache.

use std::path::Path;
use std::time::Duration;

use kshelf_core::{Package, Release, Results};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, REQUEST_TIMEOUT_SECS, Result};

/// HTTP client for a kshelf registry
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: reqwest::Client,
    base_url: Url,
}

/// Error body returned by the registry
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl SyncClient {
    /// Create a client for the registry at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("kshelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Get the registry URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/package[/<name>]`, percent-encoding the name as one path segment
    fn package_url(&self, name: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?;
            segments.pop_if_empty().push("package");
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    /// List all packages
    pub async fn list(&self) -> Result<Results> {
        let url = self.package_url(None)?;
        tracing::debug!(%url, "Listing packages");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Fetch a package by name
    ///
    /// Only `200 OK` counts as success.
    pub async fn get(&self, name: &str) -> Result<Package> {
        let url = self.package_url(Some(name))?;
        tracing::debug!(%url, "Fetching package");

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Register a new package from a local JSON definition
    ///
    /// The file is streamed as the request body unchanged; the server's
    /// canonical copy (with its assigned id and dates) is returned.
    pub async fn create_package(&self, path: &Path) -> Result<Package> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ClientError::local_io("Failed to open", path, e))?;

        let url = self.package_url(None)?;
        tracing::debug!(%url, file = %path.display(), "Creating package");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(reqwest::Body::from(file))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Add a release to a package; returns the updated package
    pub async fn update(&self, name: &str, release: &Release) -> Result<Package> {
        let url = self.package_url(Some(name))?;
        tracing::debug!(
            %url,
            version = %release.version,
            manifests = release.manifests.len(),
            "Pushing release"
        );

        let response = self.client.post(url).json(release).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }
}

/// Turn a non-success response into an error carrying the status line
async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .map(|body| body.error);

    ClientError::HttpError {
        status: status.as_u16(),
        status_text: status.to_string(),
        message,
    }
}
