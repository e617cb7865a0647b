//! Application configuration models.
//!
//! Loaded from `config.toml` in the data directory; every field has a
//! default so a partial file is always valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default source and destination instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Instance emojis are copied from.
    #[serde(default)]
    pub source_domain: Option<String>,

    /// Instance emojis are copied to.
    #[serde(default)]
    pub destination_domain: Option<String>,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("emoji-porter/{}", env!("CARGO_PKG_VERSION"))
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub transfer: TransferSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".emoji-porter")
    }

    /// Get the token database path.
    #[must_use]
    pub fn token_db_path(&self) -> PathBuf {
        self.data_dir().join("tokens.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.http.user_agent.starts_with("emoji-porter/"));
        assert!(config.transfer.source_domain.is_none());
    }

    #[test]
    fn test_custom_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/porter")),
            },
            ..Default::default()
        };
        assert_eq!(config.token_db_path(), PathBuf::from("/tmp/porter/tokens.db"));
    }
}
