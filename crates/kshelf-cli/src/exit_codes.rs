//! Exit codes for CLI operations
//!
//! Scripts only need to tell success from failure, so every reported error,
//! including a usage error, exits with `ERROR`.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// Any reported error
pub const ERROR: i32 = 1;
