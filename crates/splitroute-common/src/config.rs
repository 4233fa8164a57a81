//! TOML configuration file support.
//!
//! Both tools read an optional TOML file; a missing file means "all
//! defaults", any other read or parse failure is an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::{CommonError, CommonResult};

/// Loads configuration from `path`, falling back to defaults if the file
/// does not exist.
pub fn load_or_default<T>(path: impl AsRef<Path>) -> CommonResult<T>
where
    T: DeserializeOwned + Default,
{
    let path = path.as_ref();

    match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .map_err(|e| CommonError::config_file(path, format!("parse error: {}", e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Ok(T::default())
        }
        Err(e) => Err(CommonError::config_file(path, e.to_string())),
    }
}

/// Saves configuration to `path` as pretty-printed TOML.
pub fn save<T: Serialize>(value: &T, path: impl AsRef<Path>) -> CommonResult<()> {
    let path = path.as_ref();
    let content = toml::to_string_pretty(value)
        .map_err(|e| CommonError::config_file(path, format!("serialize error: {}", e)))?;
    fs::write(path, content).map_err(|e| CommonError::config_file(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(default = "default_metric")]
        metric: u32,
        #[serde(default)]
        name: Option<String>,
    }

    fn default_metric() -> u32 {
        6
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                metric: default_metric(),
                name: None,
            }
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config: Sample = load_or_default("/nonexistent/splitroute.toml").unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.toml");
        fs::write(&path, "name = \"tun\"\n").unwrap();

        let config: Sample = load_or_default(&path).unwrap();
        assert_eq!(config.metric, 6);
        assert_eq!(config.name.as_deref(), Some("tun"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "metric = \"six\"").unwrap();

        let result: CommonResult<Sample> = load_or_default(&path);
        assert!(matches!(result, Err(CommonError::ConfigFile { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");
        let config = Sample {
            metric: 10,
            name: Some("wg0".to_string()),
        };
        save(&config, &path).unwrap();

        let loaded: Sample = load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
