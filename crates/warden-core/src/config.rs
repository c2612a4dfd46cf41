//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::{CoreError, Result};

const DEFAULT_API_URL: &str = "https://app.wealthwarden.io/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every API path is joined against. Must end with a slash.
    pub api_base_url: Url,
    /// Path to the preference database
    pub preferences_path: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn new(api_base_url: Url, data_dir: PathBuf) -> Self {
        Self {
            api_base_url,
            preferences_path: data_dir.join("warden.db"),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_url(url: &str) -> Result<Self> {
        let api_base_url = Url::parse(url).map_err(|e| CoreError::Config(e.to_string()))?;
        Ok(Self::new(api_base_url, Self::data_dir()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("WealthWarden"))
            .unwrap_or_else(|| PathBuf::from(".wealth-warden"))
    }
}

impl Default for Config {
    fn default() -> Self {
        let api_base_url = Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| {
            // The constant is a valid URL; this branch is unreachable.
            unreachable!("default API URL must parse")
        });
        Self::new(api_base_url, Self::data_dir())
    }
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config
            .preferences_path
            .to_string_lossy()
            .ends_with("warden.db"));
    }

    #[test]
    fn test_with_api_url_rejects_garbage() {
        assert!(Config::with_api_url("not a url").is_err());
        assert!(Config::with_api_url("http://localhost:8080/api/").is_ok());
    }
}
