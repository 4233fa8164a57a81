//! Structured logging setup for the splitroute binaries.

use tracing_subscriber::EnvFilter;

use crate::error::{CommonError, CommonResult};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` (e.g. "info", "debug",
/// "regionmgr=debug") is used as the filter directive.
pub fn init(level: &str) -> CommonResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CommonError::Logging {
            message: format!("invalid log filter '{}': {}", level, e),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| CommonError::Logging {
            message: e.to_string(),
        })
}
