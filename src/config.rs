use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the extraction service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overall deadline for one outbound request, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long a resolved playlist is served from cache before the next
    /// request refetches it.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::Config(format!(
                "Configuration file not found: {}",
                path.as_ref().display()
            )))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.upstream.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.upstream.base_url.clone()))?;

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Config(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        if self.cache.retention_hours == 0 {
            return Err(ConfigError::Config(
                "Cache retention must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("PLAYLIST_PROXY_UPSTREAM_URL") {
            self.upstream.base_url = base_url;
        }

        if let Ok(port) = std::env::var("PLAYLIST_PROXY_PORT") {
            if let Ok(val) = port.parse() {
                self.server.port = val;
            }
        }

        if let Ok(level) = std::env::var("PLAYLIST_PROXY_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            Ok(PathBuf::from(config_home).join("playlist-proxy"))
        } else if let Some(home) = std::env::var_os("HOME") {
            Ok(PathBuf::from(home).join(".config").join("playlist-proxy"))
        } else {
            Err(ConfigError::Config(
                "Cannot determine configuration directory".to_string(),
            ))
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            retention_hours: default_retention_hours(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "https://playlist-extractor.onrender.com".to_string()
}
fn default_timeout() -> u64 { 30 }
fn default_user_agent() -> String {
    format!("playlist-proxy/{}", env!("CARGO_PKG_VERSION"))
}
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_retention_hours() -> u64 { 24 }
fn default_log_level() -> String { "info".to_string() }
