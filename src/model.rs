use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use url::Url;

pub const WEBAPP_URL_SCHEME: &str = "https://";

/// Per-user usage record. Lives only in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub joined_at: NaiveDateTime,
    pub username: Option<String>,
    pub first_name: String,
    pub messages_count: u64,
}

impl UserRecord {
    pub fn new(username: Option<&str>, first_name: &str, joined_at: NaiveDateTime) -> Self {
        Self {
            joined_at,
            username: username.map(str::to_owned),
            first_name: first_name.to_owned(),
            messages_count: 0,
        }
    }
}

/// Process-wide counters kept in the stats file.
///
/// `active_users` is written alongside these fields but never read back,
/// it is derived from the registry whenever it is needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub messages_sent: u64,
    #[serde(default = "now")]
    pub start_date: NaiveDateTime,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl AggregateStats {
    pub fn starting_at(start_date: NaiveDateTime) -> Self {
        Self {
            total_users: 0,
            messages_sent: 0,
            start_date,
        }
    }

    pub fn fresh() -> Self {
        Self::starting_at(now())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub webapp_url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlRejection {
    #[error("URL must start with https://")]
    MissingScheme,
    #[error("URL is not valid: {0}")]
    Unparsable(String),
}

/// Validates a candidate mini-app URL. The scheme check is a literal,
/// case-sensitive prefix match on the trimmed input.
pub fn parse_webapp_url(raw: &str) -> Result<Url, UrlRejection> {
    let candidate = raw.trim();
    if !candidate.starts_with(WEBAPP_URL_SCHEME) {
        return Err(UrlRejection::MissingScheme);
    }
    Url::parse(candidate).map_err(|e| UrlRejection::Unparsable(e.to_string()))
}
