//! Configuration loading for the Vantage client.
//!
//! Raw TOML deserialization structs (all-`Option` fields) stay private;
//! [`ClientConfig::load`] resolves them into a fully-validated value at the
//! parse boundary. A missing config file is not an error - every knob has a
//! default - but a present-and-invalid file is.
//!
//! Default location: `~/.vantage/config.toml`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.vantage.example";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAINTENANCE_POLL_SECS: u64 = 60;
const DEFAULT_TYPING_POLL_SECS: u64 = 8;
const DEFAULT_JOB_POLL_SECS: u64 = 3;
const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("base_url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

/// Directory holding config, persisted session, drafts, and logs.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vantage"))
}

/// Canonical config file path, if a home directory can be resolved.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    base_url: Option<String>,
    data_dir: Option<PathBuf>,
    connect_timeout_secs: Option<u64>,
    #[serde(default)]
    polling: RawPolling,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolling {
    maintenance_secs: Option<u64>,
    typing_secs: Option<u64>,
    job_secs: Option<u64>,
    filter_debounce_ms: Option<u64>,
}

/// Validated client configuration.
///
/// Invariants: `base_url` is an http(s) URL without a trailing slash; all
/// intervals are non-zero.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub connect_timeout: Duration,
    pub maintenance_poll: Duration,
    pub typing_poll: Duration,
    pub job_poll: Duration,
    pub filter_debounce: Duration,
}

impl ClientConfig {
    /// Load from the canonical path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = config_path() else {
            tracing::warn!("No home directory; using built-in config defaults");
            return RawConfig::default().resolve();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                RawConfig::default().resolve()
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        raw.resolve()
    }
}

impl RawConfig {
    fn resolve(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => data_dir().unwrap_or_else(|| PathBuf::from(".vantage")),
        };

        let interval = |value: Option<u64>, default: u64, name: &'static str| {
            let secs = value.unwrap_or(default);
            if secs == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
            Ok(Duration::from_secs(secs))
        };

        let debounce_ms = self
            .polling
            .filter_debounce_ms
            .unwrap_or(DEFAULT_FILTER_DEBOUNCE_MS);
        if debounce_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "polling.filter_debounce_ms",
            });
        }

        Ok(ClientConfig {
            base_url,
            data_dir,
            connect_timeout: interval(
                self.connect_timeout_secs,
                DEFAULT_CONNECT_TIMEOUT_SECS,
                "connect_timeout_secs",
            )?,
            maintenance_poll: interval(
                self.polling.maintenance_secs,
                DEFAULT_MAINTENANCE_POLL_SECS,
                "polling.maintenance_secs",
            )?,
            typing_poll: interval(
                self.polling.typing_secs,
                DEFAULT_TYPING_POLL_SECS,
                "polling.typing_secs",
            )?,
            job_poll: interval(
                self.polling.job_secs,
                DEFAULT_JOB_POLL_SECS,
                "polling.job_secs",
            )?,
            filter_debounce: Duration::from_millis(debounce_ms),
        })
    }
}
