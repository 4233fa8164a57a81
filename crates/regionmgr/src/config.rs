//! Configuration file support for regionmgr
//!
//! Loads and validates regionmgr configuration from TOML files.
//! Default location: regionmgr.toml in the working directory.
//!
//! ```toml
//! scopes = ["CN-ipv4", "CN-ipv6"]
//!
//! [source]
//! url = "http://ftp.apnic.net/apnic/stats/apnic/delegated-apnic-latest"
//! cache_path = "cache/delegated-apnic-latest"
//! cache_ttl_secs = 86400
//! timeout_secs = 60
//!
//! [output]
//! dir = "output"
//! ```

use serde::{Deserialize, Serialize};
use splitroute_common::{config, CommonError};
use splitroute_types::IpFamily;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::scope::ScopeKey;
use crate::source::DEFAULT_REGISTRY_URL;

/// Registry download and cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Delegation dump URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Local copy of the last download
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Age after which the cached copy is downloaded again
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the CIDR list files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Complete regionmgr configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Scopes to compute, e.g. "CN-ipv4"
    #[serde(default = "default_scopes")]
    pub scopes: Vec<ScopeKey>,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("cache/delegated-apnic-latest")
}

fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

fn default_timeout() -> u64 {
    60
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_scopes() -> Vec<ScopeKey> {
    [IpFamily::V4, IpFamily::V6]
        .into_iter()
        .filter_map(|family| ScopeKey::new("CN", family).ok())
        .collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            cache_path: default_cache_path(),
            cache_ttl_secs: default_cache_ttl(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RegionConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        Ok(config::load_or_default(path)?)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(config::save(self, path)?)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.source.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.scopes.is_empty() {
            return Err(CommonError::invalid_config("scopes", "at least one scope is required").into());
        }

        let url = self.source.url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(
                CommonError::invalid_config("source.url", format!("'{}' is not an http(s) URL", url))
                    .into(),
            );
        }

        if self.source.timeout_secs == 0 {
            return Err(CommonError::invalid_config("source.timeout_secs", "must be > 0").into());
        }

        if self.source.cache_path.as_os_str().is_empty() {
            return Err(CommonError::invalid_config("source.cache_path", "must not be empty").into());
        }

        Ok(())
    }
}
