//! Application configuration management.
//!
//! Holds the registration endpoint and the HTTP timeout. Values come from,
//! in order of precedence: the `VAULTREG_ENDPOINT` / `VAULTREG_TIMEOUT_SECS`
//! environment variables, `~/.config/vaultreg/config.json`, then built-in
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "vaultreg";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Registration endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://vault-reg.onrender.com/adminregistry";

/// HTTP request timeout in seconds.
/// 30s allows for a cold-starting host while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENDPOINT_ENV: &str = "VAULTREG_ENDPOINT";
const TIMEOUT_ENV: &str = "VAULTREG_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the log file.
    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Effective registration endpoint.
    pub fn endpoint(&self) -> String {
        Self::resolve_endpoint(std::env::var(ENDPOINT_ENV).ok(), self.endpoint.as_deref())
    }

    /// Effective HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Self::resolve_timeout(std::env::var(TIMEOUT_ENV).ok(), self.request_timeout_secs)
    }

    fn resolve_endpoint(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|s| !s.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn resolve_timeout(env: Option<String>, configured: Option<u64>) -> Duration {
        let from_env = env.and_then(|s| match s.trim().parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(_) => {
                warn!(value = %s, "Ignoring invalid {}", TIMEOUT_ENV);
                None
            }
        });
        let secs = from_env
            .or(configured)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "endpoint": "http://localhost:8080/adminregistry", "request_timeout_secs": 10 }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080/adminregistry"));
        assert_eq!(config.request_timeout_secs, Some(10));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "request_timeout_secs": 3 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.request_timeout_secs, Some(3));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_endpoint_precedence() {
        assert_eq!(Config::resolve_endpoint(None, None), DEFAULT_ENDPOINT);
        assert_eq!(
            Config::resolve_endpoint(None, Some("http://cfg/")),
            "http://cfg/"
        );
        assert_eq!(
            Config::resolve_endpoint(Some("http://env/".to_string()), Some("http://cfg/")),
            "http://env/"
        );
        assert_eq!(
            Config::resolve_endpoint(Some("  ".to_string()), Some("http://cfg/")),
            "http://cfg/"
        );
    }

    #[test]
    fn test_timeout_precedence() {
        let default = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        assert_eq!(Config::resolve_timeout(None, None), default);
        assert_eq!(Config::resolve_timeout(None, Some(5)), Duration::from_secs(5));
        assert_eq!(
            Config::resolve_timeout(Some("12".to_string()), Some(5)),
            Duration::from_secs(12)
        );
        assert_eq!(
            Config::resolve_timeout(Some("soon".to_string()), Some(5)),
            Duration::from_secs(5)
        );
        assert_eq!(Config::resolve_timeout(None, Some(0)), default);
    }
}
