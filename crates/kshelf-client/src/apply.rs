//! Cluster apply capability
//!
//! `install` hands each manifest file to a [`ClusterApplier`]. Production uses
//! [`KubectlApplier`]; tests inject a recorder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ApplyError;

/// How a manifest is submitted to the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyVerb {
    /// Create resources; fails if they already exist
    #[default]
    Create,
    /// Create or update resources
    Apply,
}

impl ApplyVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyVerb::Create => "create",
            ApplyVerb::Apply => "apply",
        }
    }
}

impl fmt::Display for ApplyVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplyVerb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ApplyVerb::Create),
            "apply" => Ok(ApplyVerb::Apply),
            other => Err(format!("unknown apply verb '{}' (expected create or apply)", other)),
        }
    }
}

/// Submits one manifest file to a cluster
#[async_trait]
pub trait ClusterApplier: Send + Sync {
    async fn apply(&self, path: &Path, verb: ApplyVerb) -> Result<(), ApplyError>;
}

/// Runs `kubectl <verb> -f <file>`
#[derive(Debug, Clone)]
pub struct KubectlApplier {
    program: PathBuf,
}

impl KubectlApplier {
    pub fn new() -> Self {
        Self::with_program("kubectl")
    }

    /// Use a different executable with kubectl's calling convention
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for KubectlApplier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterApplier for KubectlApplier {
    async fn apply(&self, path: &Path, verb: ApplyVerb) -> Result<(), ApplyError> {
        let program = self.program.display().to_string();
        tracing::debug!(%program, %verb, file = %path.display(), "Applying manifest");

        let output = Command::new(&self.program)
            .arg(verb.as_str())
            .arg("-f")
            .arg(path)
            .output()
            .await
            .map_err(|source| ApplyError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(ApplyError::Failed {
            program,
            status: output.status.to_string(),
            output: combined.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parse() {
        assert_eq!("create".parse::<ApplyVerb>().unwrap(), ApplyVerb::Create);
        assert_eq!("apply".parse::<ApplyVerb>().unwrap(), ApplyVerb::Apply);
        assert!("delete".parse::<ApplyVerb>().is_err());
        assert_eq!(ApplyVerb::default().to_string(), "create");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let applier = KubectlApplier::with_program("/nonexistent/kubectl");
        let err = applier
            .apply(Path::new("deploy.yaml"), ApplyVerb::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_maps_to_result() {
        let ok = KubectlApplier::with_program("true");
        ok.apply(Path::new("deploy.yaml"), ApplyVerb::Apply).await.unwrap();

        let failing = KubectlApplier::with_program("false");
        let err = failing
            .apply(Path::new("deploy.yaml"), ApplyVerb::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Failed { .. }));
    }
}
