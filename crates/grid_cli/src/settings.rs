//! Layered settings for the `grid` binary.
//!
//! Values are taken from flags, then the environment, then an optional RON
//! file, then built-in defaults. clap folds the environment into the flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use grid_client::ClientConfig;
use grid_logging::{grid_debug, LevelFilter, LogDestination};
use serde::{Deserialize, Serialize};

use crate::cli::GlobalArgs;

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

/// Contents of a `--config` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_base: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        grid_debug!("Loaded settings from {:?}", path);
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub log_level: LevelFilter,
    pub log_destination: LogDestination,
}

impl Settings {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, &file)
    }

    /// Merges parsed arguments over file values.
    pub fn resolve(args: &GlobalArgs, file: &FileConfig) -> Result<Self> {
        let mut client = ClientConfig::default();

        let api_base = args
            .api_url
            .clone()
            .filter(|raw| !raw.trim().is_empty())
            .or_else(|| file.api_base.clone());
        if let Some(raw) = api_base {
            client = client.with_api_base(&raw).context("invalid API base URL")?;
        }

        let poll_interval = args
            .poll_interval_ms
            .or(file.poll_interval_ms)
            .map(Duration::from_millis);
        if let Some(interval) = poll_interval {
            client = client
                .with_poll_interval(interval)
                .context("invalid poll interval")?;
        }

        client.request_timeout = file
            .request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let log_level = match args.log_level.as_deref().or(file.log_level.as_deref()) {
            Some(raw) => LevelFilter::from_str(raw.trim())
                .map_err(|_| anyhow::anyhow!("unknown log level {raw:?}"))?,
            None => DEFAULT_LOG_LEVEL,
        };

        Ok(Self {
            client,
            log_level,
            log_destination: log_destination(args.log_file.clone()),
        })
    }
}

fn log_destination(log_file: Option<PathBuf>) -> LogDestination {
    match log_file {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    }
}
