use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::model::{AggregateStats, AppConfig, WEBAPP_URL_SCHEME};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value in {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Serialize)]
struct StatsDocument<'a> {
    total_users: u64,
    active_users: usize,
    messages_sent: u64,
    start_date: &'a chrono::NaiveDateTime,
}

/// The two JSON documents the bot keeps on disk. Each read and write
/// covers the whole file.
#[derive(Clone, Debug)]
pub struct JsonStore {
    stats_path: PathBuf,
    config_path: PathBuf,
}

impl JsonStore {
    pub fn new(stats_path: impl Into<PathBuf>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            stats_path: stats_path.into(),
            config_path: config_path.into(),
        }
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn try_load_stats(&self) -> Result<AggregateStats, StoreError> {
        read_json(&self.stats_path)
    }

    /// Loads the stats document, falling back to zeroed counters that start now.
    pub fn load_stats(&self) -> AggregateStats {
        match self.try_load_stats() {
            Ok(stats) => stats,
            Err(e) => {
                log_load_failure(&e);
                AggregateStats::fresh()
            }
        }
    }

    pub fn save_stats(&self, stats: &AggregateStats, active_users: usize) -> Result<(), StoreError> {
        let document = StatsDocument {
            total_users: stats.total_users,
            active_users,
            messages_sent: stats.messages_sent,
            start_date: &stats.start_date,
        };
        write_json(&self.stats_path, &document)
    }

    pub fn try_load_config(&self) -> Result<AppConfig, StoreError> {
        let config: AppConfig = read_json(&self.config_path)?;
        if config.webapp_url.as_str().starts_with(WEBAPP_URL_SCHEME) {
            Ok(config)
        } else {
            Err(StoreError::Invalid {
                path: self.config_path.clone(),
                reason: format!("webapp_url {} is not an https URL", config.webapp_url),
            })
        }
    }

    /// Loads the config document, falling back to `default_url`.
    pub fn load_config(&self, default_url: &Url) -> AppConfig {
        match self.try_load_config() {
            Ok(config) => config,
            Err(e) => {
                log_load_failure(&e);
                AppConfig {
                    webapp_url: default_url.clone(),
                }
            }
        }
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<(), StoreError> {
        write_json(&self.config_path, config)
    }
}

fn log_load_failure(error: &StoreError) {
    match error {
        StoreError::Missing(path) => log::info!("{} not found, using defaults", path.display()),
        other => log::error!("Failed to load {}, using defaults", other),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::Missing(path.to_path_buf())
        } else {
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
