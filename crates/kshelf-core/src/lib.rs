//! kshelf Core - Core types for the Kubernetes manifest registry
//!
//! This crate provides the wire model shared by the registry server and the CLI:
//! - `Package`: a named deployable unit with its release history (newest first)
//! - `Release`: one immutable version of a package's manifest bundle
//! - `Manifest`: a single named manifest file
//! - `Results`: the list envelope returned by `GET /package`

pub mod error;
pub mod package;
pub mod release;

pub use error::{CoreError, Result};
pub use package::{Package, Results};
pub use release::{Manifest, Release};
