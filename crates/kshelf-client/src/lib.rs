//! kshelf Client - registry sync, local cache and cluster install
//!
//! This crate implements the client half of kshelf:
//!
//! - **Sync client** (`http`): list, get, create and update packages over HTTP
//! - **Local cache** (`cache`): one directory per package under `~/.kshelf`
//! - **Applier** (`apply`): hands manifest files to `kubectl`
//! - **Workflows** (`workflow`): the get/push/install/create/list commands
//!
//! ## Example
//!
//! ```rust,no_run
//! use kshelf_client::{ClientConfig, Workflow};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::resolve(None, None);
//! let workflow = Workflow::from_config(&config)?;
//!
//! // Fetch the newest release into ~/.kshelf/deis:postgres
//! let report = workflow.get("deis:postgres").await?;
//! println!("{:?}", report.version);
//!
//! // Bundle the directory back up as 1.0.1
//! workflow.push("deis:postgres", "1.0.1").await?;
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod workflow;

pub use apply::{ApplyVerb, ClusterApplier, KubectlApplier};
pub use cache::{Collected, LocalCache, Materialized, SkippedFile};
pub use config::{ClientConfig, DEFAULT_HOST, default_home};
pub use error::{ApplyError, ClientError, Result};
pub use http::SyncClient;
pub use workflow::{FailedApply, GetReport, InstallReport, PushReport, Workflow};
