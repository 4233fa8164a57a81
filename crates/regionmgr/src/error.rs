//! Error types for regionmgr

use std::path::PathBuf;

use splitroute_common::CommonError;
use splitroute_ipset::SetError;
use thiserror::Error;

/// Region manager errors
#[derive(Error, Debug)]
pub enum RegionError {
    /// Set algebra rejected its input (internal consistency defect)
    #[error("Set operation failed: {0}")]
    Set(#[from] SetError),

    /// Configuration, subprocess or logging failure
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Registry download failed before a response arrived
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Registry answered with a non-success status
    #[error("Registry {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Cache file could not be read, written or removed
    #[error("Cache error at {path}: {message}")]
    Cache { path: PathBuf, message: String },

    /// Output file could not be written
    #[error("Failed to write {path}: {message}")]
    Output { path: PathBuf, message: String },

    /// Scope key is not of the form CC-ipv4 / CC-ipv6
    #[error("Invalid scope '{0}' (expected e.g. CN-ipv4)")]
    InvalidScope(String),
}

impl RegionError {
    pub fn cache(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Cache {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Output {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for failures a later attempt may not hit (network).
    pub fn is_retryable(&self) -> bool {
        match self {
            RegionError::Fetch { .. } => true,
            RegionError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for regionmgr operations
pub type Result<T> = std::result::Result<T, RegionError>;
