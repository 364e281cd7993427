//! Release and manifest types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, Result};

/// One immutable version of a package's manifest bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Release {
    /// Identifier, unique within the owning package's history
    pub id: u64,

    /// Free-form version label
    pub version: String,

    /// Release notes
    pub description: String,

    /// Who pushed the release
    pub author: String,

    /// Push timestamp, stamped by the client
    pub date: DateTime<Utc>,

    pub rating: f64,

    /// Bundled manifest files, in the order they were collected
    #[serde(deserialize_with = "null_as_empty")]
    pub manifests: Vec<Manifest>,

    /// Back-reference to the owning package
    pub package_id: u64,
}

impl Release {
    /// Build a release for a push, stamped with the current time
    pub fn for_push(
        version: impl Into<String>,
        author: impl Into<String>,
        package_id: u64,
        manifests: Vec<Manifest>,
    ) -> Self {
        Self {
            id: 0,
            version: version.into(),
            description: String::new(),
            author: author.into(),
            date: Utc::now(),
            rating: 0.0,
            manifests,
            package_id,
        }
    }

    /// Find a manifest by file name
    pub fn manifest(&self, name: &str) -> Option<&Manifest> {
        self.manifests.iter().find(|m| m.name == name)
    }
}

/// A single named manifest file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// File name, without any directory component
    pub name: String,

    /// Raw file contents
    pub data: String,
}

impl Manifest {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Check that the name can be written as a single file inside a cache directory
    pub fn validate_name(&self) -> Result<()> {
        let reason = if self.name.is_empty() {
            Some("name is empty")
        } else if self.name == "." || self.name == ".." {
            Some("name refers to a directory")
        } else if self.name.contains('/') || self.name.contains('\\') {
            Some("name contains a path separator")
        } else if self.name.contains('\0') {
            Some("name contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidManifestName {
                name: self.name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Accept `null` for sequences written by clients that encode empty lists that way
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_push_stamps_date() {
        let before = Utc::now();
        let release = Release::for_push("1.0.0", "ops@example.com", 7, vec![]);
        assert_eq!(release.id, 0);
        assert_eq!(release.package_id, 7);
        assert_eq!(release.version, "1.0.0");
        assert!(release.date >= before);
    }

    #[test]
    fn test_manifest_lookup() {
        let release = Release::for_push(
            "1.0.0",
            "",
            1,
            vec![
                Manifest::new("deploy.yaml", "kind: Deployment"),
                Manifest::new("svc.yaml", "kind: Service"),
            ],
        );
        assert_eq!(
            release.manifest("svc.yaml").map(|m| m.data.as_str()),
            Some("kind: Service")
        );
        assert!(release.manifest("missing.yaml").is_none());
    }

    #[test]
    fn test_validate_manifest_name() {
        assert!(Manifest::new("deploy.yaml", "").validate_name().is_ok());
        assert!(Manifest::new(".hidden.json", "").validate_name().is_ok());
        assert!(Manifest::new("", "").validate_name().is_err());
        assert!(Manifest::new("..", "").validate_name().is_err());
        assert!(Manifest::new("../etc/passwd", "").validate_name().is_err());
        assert!(Manifest::new("dir\\file.yaml", "").validate_name().is_err());
    }

    #[test]
    fn test_null_manifests_decode_as_empty() {
        let release: Release =
            serde_json::from_str(r#"{"version": "1.0.0", "manifests": null}"#).unwrap();
        assert!(release.manifests.is_empty());
    }
}
