use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use crate::config::Settings;
use crate::handlers::admin::AdminSet;
use crate::model::{AggregateStats, AppConfig, UrlRejection, parse_webapp_url};
use crate::registry::UserRegistry;
use crate::storage::JsonStore;

/// Handlers for different chats may run concurrently, so all shared state
/// sits behind this one lock.
pub type SharedContext = Arc<Mutex<AppContext>>;

/// Everything the handlers read or mutate: known users, counters, the
/// current mini-app URL, the admin list and the on-disk store.
#[derive(Debug)]
pub struct AppContext {
    admins: AdminSet,
    store: JsonStore,
    registry: UserRegistry,
    stats: AggregateStats,
    config: AppConfig,
}

impl AppContext {
    pub fn new(admins: AdminSet, store: JsonStore, stats: AggregateStats, config: AppConfig) -> Self {
        Self {
            admins,
            store,
            registry: UserRegistry::new(),
            stats,
            config,
        }
    }

    /// Builds the context from startup settings, loading whatever the store
    /// has and falling back to defaults for anything missing or broken.
    pub fn bootstrap(settings: &Settings) -> Self {
        let store = JsonStore::new(&settings.stats_path, &settings.config_path);
        log::info!(
            "Using stats file {} and config file {}",
            store.stats_path().display(),
            store.config_path().display()
        );
        if settings.admins.is_empty() {
            log::warn!("ADMIN_IDS is empty, admin features are disabled");
        }
        let stats = store.load_stats();
        let config = store.load_config(&settings.default_webapp_url);
        Self::new(settings.admins.clone(), store, stats, config)
    }

    pub fn into_shared(self) -> SharedContext {
        Arc::new(Mutex::new(self))
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.is_admin(user_id)
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    /// Counts one inbound event from a user and persists the counters.
    /// Returns `true` for a first-time contact.
    pub fn record_activity(&mut self, user_id: i64, username: Option<&str>, first_name: &str) -> bool {
        let is_new = self.registry.touch(user_id, username, first_name);
        if is_new {
            self.stats.total_users += 1;
            log::info!("New user {} ({})", user_id, first_name);
        }
        self.stats.messages_sent += 1;
        self.persist_stats();
        is_new
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn active_users(&self) -> usize {
        self.registry.active_count()
    }

    pub fn webapp_url(&self) -> &Url {
        &self.config.webapp_url
    }

    /// Validates and applies a new mini-app URL. On success the config is
    /// written to disk; on rejection nothing changes.
    pub fn set_webapp_url(&mut self, raw: &str) -> Result<Url, UrlRejection> {
        let url = parse_webapp_url(raw)?;
        self.config.webapp_url = url.clone();
        log::info!("Web app URL set to {}", url);
        if let Err(e) = self.store.save_config(&self.config) {
            log::error!("Failed to save config: {}", e);
        }
        Ok(url)
    }

    /// Ids of everyone known right now. Users who show up later are not included.
    pub fn broadcast_recipients(&self) -> Vec<i64> {
        self.registry.ids()
    }

    fn persist_stats(&self) {
        if let Err(e) = self.store.save_stats(&self.stats, self.active_users()) {
            log::error!("Failed to save stats: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context_in(dir: &TempDir, admin_ids: &str) -> AppContext {
        let store = JsonStore::new(dir.path().join("stats.json"), dir.path().join("config.json"));
        let config = AppConfig {
            webapp_url: Url::parse("https://default.example/").unwrap(),
        };
        AppContext::new(AdminSet::parse(admin_ids), store, AggregateStats::fresh(), config)
    }

    #[test]
    fn test_first_contact_counts_once() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "");

        assert!(ctx.record_activity(42, Some("alice"), "Alice"));
        assert_eq!(ctx.stats().total_users, 1);
        assert_eq!(ctx.stats().messages_sent, 1);
        assert_eq!(ctx.registry().lookup(42).unwrap().messages_count, 1);
    }

    #[test]
    fn test_repeat_contact_only_bumps_messages() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "");

        ctx.record_activity(42, Some("alice"), "Alice");
        for expected in 2..=5 {
            assert!(!ctx.record_activity(42, Some("alice"), "Alice"));
            assert_eq!(ctx.registry().lookup(42).unwrap().messages_count, expected);
        }
        assert_eq!(ctx.stats().total_users, 1);
        assert_eq!(ctx.stats().messages_sent, 5);
    }

    #[test]
    fn test_activity_is_persisted() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "");
        ctx.record_activity(1, None, "One");
        ctx.record_activity(2, None, "Two");
        ctx.record_activity(2, None, "Two");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("stats.json")).unwrap()).unwrap();
        assert_eq!(raw["total_users"], 2);
        assert_eq!(raw["active_users"], 2);
        assert_eq!(raw["messages_sent"], 3);
    }

    #[test]
    fn test_failed_persist_does_not_lose_counters() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store = JsonStore::new(dir.path().join("missing").join("stats.json"), dir.path().join("config.json"));
        let config = AppConfig {
            webapp_url: Url::parse("https://default.example/").unwrap(),
        };
        let mut ctx = AppContext::new(AdminSet::default(), store, AggregateStats::fresh(), config);

        ctx.record_activity(9, None, "Nine");
        assert_eq!(ctx.stats().messages_sent, 1);
    }

    #[test]
    fn test_empty_admin_set_denies_everyone() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "");
        ctx.record_activity(42, None, "Someone");
        assert!(!ctx.is_admin(42));
        assert_eq!(ctx.admin_count(), 0);
    }

    #[test]
    fn test_invalid_url_leaves_config_untouched() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "7");

        assert_eq!(ctx.set_webapp_url("http://bad"), Err(UrlRejection::MissingScheme));
        assert_eq!(ctx.webapp_url().as_str(), "https://default.example/");
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn test_valid_url_is_applied_and_saved() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "7");

        let url = ctx.set_webapp_url("https://good.example/").unwrap();
        assert_eq!(url.as_str(), "https://good.example/");
        assert_eq!(ctx.webapp_url(), &url);

        let reloaded = JsonStore::new(dir.path().join("stats.json"), dir.path().join("config.json"))
            .load_config(&Url::parse("https://fallback.example/").unwrap());
        assert_eq!(reloaded.webapp_url.as_str(), "https://good.example/");
    }

    #[test]
    fn test_bootstrap_keeps_existing_start_date() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        fs::write(
            dir.path().join("stats.json"),
            r#"{"total_users": 5, "active_users": 2, "messages_sent": 40, "start_date": "2024-09-01T08:00:00"}"#,
        )
        .unwrap();
        let settings = Settings {
            bot_token: "1:token".to_string(),
            admins: AdminSet::parse("7"),
            default_webapp_url: Url::parse("https://env.example/").unwrap(),
            stats_path: dir.path().join("stats.json"),
            config_path: dir.path().join("config.json"),
        };

        let ctx = AppContext::bootstrap(&settings);
        assert_eq!(ctx.stats().total_users, 5);
        assert_eq!(ctx.stats().messages_sent, 40);
        assert_eq!(ctx.stats().start_date.format("%Y-%m-%d").to_string(), "2024-09-01");
        assert_eq!(ctx.active_users(), 0);
        assert_eq!(ctx.webapp_url().as_str(), "https://env.example/");
    }

    #[test]
    fn test_recipients_snapshot() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut ctx = context_in(&dir, "");
        ctx.record_activity(1, None, "One");
        ctx.record_activity(2, None, "Two");

        let mut recipients = ctx.broadcast_recipients();
        ctx.record_activity(3, None, "Three");
        recipients.sort();
        assert_eq!(recipients, vec![1, 2]);
    }
}
