//! CLI command implementations

pub mod create;
pub mod get;
pub mod install;
pub mod list;
pub mod push;
