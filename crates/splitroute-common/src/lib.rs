//! Common infrastructure for the splitroute tools.
//!
//! This crate provides functionality shared by `regionmgr` and `routesync`:
//!
//! - [`shell`]: Subprocess execution with captured output
//! - [`config`]: TOML configuration loading with default fallback
//! - [`logging`]: `tracing` subscriber setup for the binaries
//! - [`error`]: Error types for the above
//!
//! # Example
//!
//! ```ignore
//! use splitroute_common::{shell, CommonResult};
//!
//! async fn print_routes() -> CommonResult<String> {
//!     let result = shell::exec("route", &["print", "128.0.0.0", "-4"]).await?;
//!     Ok(result.stdout)
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod shell;

// Re-export commonly used items at crate root
pub use error::{CommonError, CommonResult};
pub use shell::ExecResult;
