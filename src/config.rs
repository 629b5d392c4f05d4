use std::env;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use url::Url;

use crate::handlers::admin::AdminSet;
use crate::model::parse_webapp_url;

pub const DEFAULT_STATS_FILE: &str = "stats.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
/// Used when `WEBAPP_URL` is not set.
pub const DEFAULT_WEBAPP_URL: &str = "https://p0leno.github.io/enazvalox/";

/// Startup settings, read once from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bot_token: String,
    pub admins: AdminSet,
    pub default_webapp_url: Url,
    pub stats_path: PathBuf,
    pub config_path: PathBuf,
}

/// Loads `.env` if present, then reads [`Settings`] from the process environment.
pub fn load_environment() -> anyhow::Result<Settings> {
    if let Err(e) = dotenv::dotenv() {
        log::debug!("No .env file loaded: {}", e);
    }
    Settings::from_lookup(|key| env::var(key).ok())
}

impl Settings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = non_empty("BOT_TOKEN")
            .or_else(|| non_empty("TELOXIDE_TOKEN"))
            .ok_or_else(|| anyhow!("BOT_TOKEN (or TELOXIDE_TOKEN) must be set"))?;

        let admins = AdminSet::parse(&lookup("ADMIN_IDS").unwrap_or_default());

        let raw_url = non_empty("WEBAPP_URL").unwrap_or_else(|| {
            log::info!("WEBAPP_URL is not set, using {}", DEFAULT_WEBAPP_URL);
            DEFAULT_WEBAPP_URL.to_string()
        });
        let default_webapp_url =
            parse_webapp_url(&raw_url).with_context(|| format!("WEBAPP_URL {raw_url:?} is invalid"))?;

        let stats_path = non_empty("STATS_FILE").unwrap_or_else(|| DEFAULT_STATS_FILE.to_string());
        let config_path = non_empty("CONFIG_FILE").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            admins,
            default_webapp_url,
            stats_path: PathBuf::from(stats_path),
            config_path: PathBuf::from(config_path),
        })
    }
}
