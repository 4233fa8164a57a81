//! Error types for routesync

use std::path::PathBuf;

use splitroute_common::CommonError;
use splitroute_types::ParseError;
use thiserror::Error;

/// Route synchronizer errors
#[derive(Error, Debug)]
pub enum RouteSyncError {
    /// The route table has no third-party route: the tunnel is not up
    #[error("No third-party interface found; make sure the tunnel is up")]
    TunnelOffline,

    /// `route print` output did not have the expected shape
    #[error("Unexpected route table output: {reason}")]
    InvalidRouteTableOutput { reason: String },

    /// The CIDR list file is missing, empty or malformed
    #[error("Invalid CIDR file {path}: {reason}")]
    InvalidCidrFile { path: PathBuf, reason: String },

    /// An address or block could not be built
    #[error("Invalid address: {0}")]
    Address(#[from] ParseError),

    /// Subprocess, configuration or logging failure
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl RouteSyncError {
    pub fn invalid_output(reason: impl Into<String>) -> Self {
        Self::InvalidRouteTableOutput {
            reason: reason.into(),
        }
    }

    pub fn invalid_cidr_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidCidrFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for conditions that may clear up once the environment
    /// changes (the tunnel comes up); everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RouteSyncError::TunnelOffline)
    }
}

/// Result type for routesync operations
pub type Result<T> = std::result::Result<T, RouteSyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_offline_is_recoverable() {
        assert!(RouteSyncError::TunnelOffline.is_recoverable());
        assert!(!RouteSyncError::invalid_output("truncated").is_recoverable());
        assert!(!RouteSyncError::invalid_cidr_file("x.txt", "empty").is_recoverable());
        assert!(!RouteSyncError::from(CommonError::invalid_config("metric", "0")).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = RouteSyncError::invalid_cidr_file("output/CN-ipv4-overseas.txt", "file is empty");
        assert_eq!(
            err.to_string(),
            "Invalid CIDR file output/CN-ipv4-overseas.txt: file is empty"
        );
    }
}
