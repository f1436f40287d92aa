use std::sync::LazyLock;
use std::time::Duration;

use url::Url;

use crate::ConfigError;

/// API base used when no override is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";
/// Delay between progress polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

pub const API_URL_ENV: &str = "GRID_API_URL";
pub const POLL_INTERVAL_ENV: &str = "GRID_POLL_INTERVAL_MS";

static DEFAULT_API_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_API_BASE).expect("valid default api base"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base: Url,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    /// `None` leaves individual requests bounded only by the transport.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE_URL.clone(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `GRID_API_URL` and `GRID_POLL_INTERVAL_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base(&raw)?;
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV).filter(|v| !v.trim().is_empty()) {
            config.poll_interval = parse_poll_interval_ms(&raw)?;
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_api_base(raw)?;
        Ok(self)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval {
                value: format!("{interval:?}"),
            });
        }
        self.poll_interval = interval;
        Ok(self)
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Appends path segments to the api base; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // parse_api_base rejects cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

pub fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidApiBase {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidApiBase {
            value: raw.to_string(),
            reason: "expected an http(s) url".to_string(),
        });
    }
    Ok(url)
}

pub fn parse_poll_interval_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidPollInterval {
            value: raw.to_string(),
        }),
    }
}
