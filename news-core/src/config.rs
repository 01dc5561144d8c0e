use std::path::Path;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";
pub const DEFAULT_COUNTRY: &str = "us";
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

/// How the `country` query parameter is chosen for each remote fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CountryPolicy {
    /// Uniform pick from the list on every fetch.
    Random { countries: Vec<String> },
    Fixed { country: String },
}

impl Default for CountryPolicy {
    fn default() -> Self {
        CountryPolicy::Random {
            countries: ["us", "gb", "ca", "au", "in"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl CountryPolicy {
    pub fn pick(&self) -> String {
        match self {
            CountryPolicy::Random { countries } => countries
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
            CountryPolicy::Fixed { country } => country.clone(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub endpoint: String,
    pub api_key: String,
    pub countries: CountryPolicy,
    /// Articles requested per remote fetch.
    pub page_size: u32,
    /// Articles moved from the cache into the working list per pass.
    pub batch_size: usize,
    /// Articles shown right after a fetch triggered by an empty cache.
    pub initial_take: usize,
    /// Articles shown right after a fetch triggered by an exhausted cache.
    pub refill_take: usize,
    pub interval_ms: u64,
    pub request_timeout_secs: u64,
    pub dedup_on_merge: bool,
    /// Consecutive failed passes after which sync health reports `Failing`.
    pub failing_after: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key: String::new(),
            countries: CountryPolicy::default(),
            page_size: 100,
            batch_size: 6,
            initial_take: 10,
            refill_take: 5,
            interval_ms: 2_000,
            request_timeout_secs: 10,
            dedup_on_merge: false,
            failing_after: 5,
        }
    }
}

// keep the API key out of logs
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "api_key",
                &if self.api_key.is_empty() { "" } else { "[REDACTED]" },
            )
            .field("countries", &self.countries)
            .field("page_size", &self.page_size)
            .field("batch_size", &self.batch_size)
            .field("initial_take", &self.initial_take)
            .field("refill_take", &self.refill_take)
            .field("interval_ms", &self.interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("dedup_on_merge", &self.dedup_on_merge)
            .field("failing_after", &self.failing_after)
            .finish()
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Loads the config at `path`, falling back to defaults when the file is
    /// missing or unreadable. The `NEWS_API_KEY` variable always wins over the
    /// file's `api_key`.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut config = match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to load config, using defaults");
                Self::default()
            }
        };
        config.apply_env();
        config
    }

    /// Strict variant of [`SyncConfig::from_file`]: a missing file yields the
    /// defaults, anything else that goes wrong is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SyncConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_owned();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint scheme must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".into()));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid("interval_ms must be positive".into()));
        }
        if let CountryPolicy::Fixed { country } = &self.countries {
            if country.trim().is_empty() {
                return Err(ConfigError::Invalid("fixed country is empty".into()));
            }
        }
        Ok(())
    }
}
