//! Package definition and release history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::release::{Release, null_as_empty};

/// A named deployable unit tracked by the registry
///
/// `releases` is ordered newest first: index 0 is the current release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    /// Store-assigned identifier (0 until inserted)
    pub id: u64,

    /// Unique name, immutable once created
    pub name: String,

    pub description: String,

    pub readme: String,

    /// Release history, newest first
    #[serde(deserialize_with = "null_as_empty")]
    pub releases: Vec<Release>,

    pub author: String,

    pub creation_date: DateTime<Utc>,

    /// Refreshed on every release addition
    pub last_updated: DateTime<Utc>,

    pub rating: f64,

    pub certified: bool,

    pub downloads: u64,
}

impl Package {
    /// Create an unpublished package
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a package definition from JSON bytes
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// The current (newest) release, if any
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.first()
    }

    /// Whether at least one release has been pushed
    pub fn is_published(&self) -> bool {
        !self.releases.is_empty()
    }

    /// Next free release id within this package's history
    ///
    /// `None` when the highest stored id is already `u64::MAX`.
    pub fn next_release_id(&self) -> Option<u64> {
        self.releases
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
    }

    /// Prepend a release, keeping the newest-first order
    ///
    /// The release gets the next free id and a back-reference to this
    /// package, and `last_updated` is set to `now`. The order of existing
    /// releases is preserved.
    pub fn prepend_release(
        &mut self,
        mut release: Release,
        now: DateTime<Utc>,
    ) -> Result<&Release> {
        release.id = self
            .next_release_id()
            .ok_or_else(|| CoreError::ReleaseIdsExhausted {
                name: self.name.clone(),
            })?;
        release.package_id = self.id;
        self.releases.insert(0, release);
        self.last_updated = now;
        Ok(&self.releases[0])
    }

    /// Validate a package name
    ///
    /// Names are used as a URL path segment and as a cache directory name.
    pub fn validate_name(name: &str) -> Result<()> {
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name == "." || name == ".." {
            Some("name refers to a directory")
        } else if name.contains('/') || name.contains('\\') {
            Some("name contains a path separator")
        } else if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("name contains whitespace or control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CoreError::InvalidName {
                name: name.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// List envelope returned by `GET /package`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Results {
    pub count: usize,
    pub offset: usize,
    pub total: usize,
    #[serde(deserialize_with = "null_as_empty")]
    pub results: Vec<Package>,
}

impl Results {
    /// Wrap a complete, unpaginated package list
    pub fn from_packages(packages: Vec<Package>) -> Self {
        Self {
            count: packages.len(),
            offset: 0,
            total: packages.len(),
            results: packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Manifest;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn released_package() -> Package {
        let mut pkg = Package::new("team:widgets");
        pkg.id = 3;
        pkg.description = "Widgets service".to_string();
        pkg.author = "ops@example.com".to_string();
        pkg.creation_date = at(1_704_067_200);
        pkg.last_updated = at(1_704_067_200);
        pkg.rating = 4.5;
        let mut release = Release::for_push(
            "1.0.0",
            "ops@example.com",
            3,
            vec![Manifest::new("deploy.yaml", "kind: Deployment\n")],
        );
        release.date = at(1_704_153_600);
        pkg.prepend_release(release, at(1_704_153_600)).unwrap();
        pkg
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string_pretty(&released_package()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "id": 3,
          "name": "team:widgets",
          "description": "Widgets service",
          "readme": "",
          "releases": [
            {
              "id": 1,
              "version": "1.0.0",
              "description": "",
              "author": "ops@example.com",
              "date": "2024-01-02T00:00:00Z",
              "rating": 0.0,
              "manifests": [
                {
                  "name": "deploy.yaml",
                  "data": "kind: Deployment\n"
                }
              ],
              "packageId": 3
            }
          ],
          "author": "ops@example.com",
          "creationDate": "2024-01-01T00:00:00Z",
          "lastUpdated": "2024-01-02T00:00:00Z",
          "rating": 4.5,
          "certified": false,
          "downloads": 0
        }
        "#);
    }

    #[test]
    fn test_roundtrip_released_and_unreleased() {
        for pkg in [Package::new("deis:postgres"), released_package()] {
            let json = serde_json::to_vec(&pkg).unwrap();
            let decoded = Package::from_json(&json).unwrap();
            assert_eq!(pkg, decoded);
        }
    }

    #[test]
    fn test_minimal_definition_decodes_with_defaults() {
        let pkg = Package::from_json(br#"{"name": "team:widgets", "author": "me"}"#).unwrap();
        assert_eq!(pkg.name, "team:widgets");
        assert_eq!(pkg.id, 0);
        assert!(pkg.releases.is_empty());
        assert!(!pkg.is_published());
        assert!(pkg.latest_release().is_none());
    }

    #[test]
    fn test_null_releases_decode_as_empty() {
        let pkg = Package::from_json(br#"{"name": "a", "releases": null}"#).unwrap();
        assert!(pkg.releases.is_empty());
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut pkg = Package::new("team:widgets");
        pkg.id = 9;
        pkg.prepend_release(Release::for_push("v1", "", 0, vec![]), at(10)).unwrap();
        pkg.prepend_release(Release::for_push("v2", "", 0, vec![]), at(20)).unwrap();
        pkg.prepend_release(Release::for_push("v3", "", 0, vec![]), at(30)).unwrap();

        let versions: Vec<&str> = pkg.releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["v3", "v2", "v1"]);
        let ids: Vec<u64> = pkg.releases.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(pkg.releases.iter().all(|r| r.package_id == 9));
        assert_eq!(pkg.last_updated, at(30));
        assert_eq!(pkg.latest_release().map(|r| r.version.as_str()), Some("v3"));
    }

    #[test]
    fn test_next_release_id_uses_max() {
        let mut pkg = Package::new("a");
        let mut old = Release::for_push("old", "", 0, vec![]);
        old.id = 41;
        pkg.releases.push(old);
        assert_eq!(pkg.next_release_id(), Some(42));
    }

    #[test]
    fn test_prepend_fails_when_ids_exhausted() {
        let mut pkg = Package::new("app");
        let mut last = Release::for_push("last", "", 0, vec![]);
        last.id = u64::MAX;
        pkg.releases.push(last);
        let before = pkg.clone();

        assert_eq!(pkg.next_release_id(), None);
        let err = pkg
            .prepend_release(Release::for_push("next", "", 0, vec![]), at(10))
            .unwrap_err();
        assert!(matches!(err, CoreError::ReleaseIdsExhausted { name } if name == "app"));
        assert_eq!(pkg, before);
    }

    #[test]
    fn test_validate_name() {
        assert!(Package::validate_name("team:widgets").is_ok());
        assert!(Package::validate_name("deis-postgres_1.2").is_ok());
        assert!(Package::validate_name("").is_err());
        assert!(Package::validate_name("..").is_err());
        assert!(Package::validate_name("team/widgets").is_err());
        assert!(Package::validate_name("team widgets").is_err());
    }

    #[test]
    fn test_results_from_packages() {
        let results = Results::from_packages(vec![Package::new("a"), Package::new("b")]);
        assert_eq!(results.count, 2);
        assert_eq!(results.total, 2);
        assert_eq!(results.offset, 0);
        assert_eq!(results.results[1].name, "b");
    }
}
