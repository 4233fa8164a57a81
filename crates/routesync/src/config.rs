//! Configuration file support for routesync
//!
//! ```toml
//! cidr_file = "output/CN-ipv4-overseas.txt"
//! metric = 6
//! offline_retries = 3
//! retry_interval_secs = 10
//! tunnel_start_command = ["rasdial", "corp-vpn"]
//! fallback_gateway = "10.173.172.133"
//! ```

use serde::{Deserialize, Serialize};
use splitroute_common::{config, CommonError};
use splitroute_types::IpAddress;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Complete routesync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSyncConfig {
    /// Overseas CIDR list produced by regionmgr
    #[serde(default = "default_cidr_file")]
    pub cidr_file: PathBuf,

    /// Metric of every injected route
    #[serde(default = "default_metric")]
    pub metric: u32,

    /// Extra gateway lookups while the tunnel is offline
    #[serde(default = "default_offline_retries")]
    pub offline_retries: u32,

    /// Wait between gateway lookups in seconds
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Program and arguments that bring the tunnel up
    #[serde(default)]
    pub tunnel_start_command: Option<Vec<String>>,

    /// Gateway used when the tunnel stays offline
    #[serde(default)]
    pub fallback_gateway: Option<IpAddress>,
}

fn default_cidr_file() -> PathBuf {
    PathBuf::from("output/CN-ipv4-overseas.txt")
}

fn default_metric() -> u32 {
    6
}

fn default_offline_retries() -> u32 {
    0
}

fn default_retry_interval() -> u64 {
    10
}

impl Default for RouteSyncConfig {
    fn default() -> Self {
        Self {
            cidr_file: default_cidr_file(),
            metric: default_metric(),
            offline_retries: default_offline_retries(),
            retry_interval_secs: default_retry_interval(),
            tunnel_start_command: None,
            fallback_gateway: None,
        }
    }
}

impl RouteSyncConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        Ok(config::load_or_default(path)?)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.metric == 0 {
            return Err(CommonError::invalid_config("metric", "must be > 0").into());
        }

        if self
            .tunnel_start_command
            .as_ref()
            .is_some_and(|command| command.is_empty())
        {
            return Err(
                CommonError::invalid_config("tunnel_start_command", "must name a program").into(),
            );
        }

        if let Some(gateway) = &self.fallback_gateway {
            if !gateway.is_ipv4() {
                return Err(CommonError::invalid_config(
                    "fallback_gateway",
                    format!("{} is not an IPv4 address", gateway),
                )
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteSyncError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = RouteSyncConfig::default();
        assert_eq!(config.metric, 6);
        assert_eq!(config.offline_retries, 0);
        assert_eq!(config.retry_interval(), Duration::from_secs(10));
        assert_eq!(config.cidr_file, PathBuf::from("output/CN-ipv4-overseas.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml() {
        let config: RouteSyncConfig = toml::from_str(
            r#"
cidr_file = "/var/lib/splitroute/CN-ipv4-overseas.txt"
metric = 10
offline_retries = 3
retry_interval_secs = 5
tunnel_start_command = ["rasdial", "corp-vpn"]
fallback_gateway = "10.173.172.133"
"#,
        )
        .unwrap();
        assert_eq!(config.metric, 10);
        assert_eq!(config.offline_retries, 3);
        assert_eq!(
            config.tunnel_start_command,
            Some(vec!["rasdial".to_string(), "corp-vpn".to_string()])
        );
        assert_eq!(
            config.fallback_gateway.map(|g| g.to_string()),
            Some("10.173.172.133".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = RouteSyncConfig {
            metric: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RouteSyncError::Common(CommonError::InvalidConfig { .. }))
        ));

        let config = RouteSyncConfig {
            tunnel_start_command: Some(vec![]),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RouteSyncConfig {
            fallback_gateway: Some("fe80::1".parse().unwrap()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = RouteSyncConfig::load_or_default("/nonexistent/routesync.toml").unwrap();
        assert_eq!(config, RouteSyncConfig::default());
    }
}
