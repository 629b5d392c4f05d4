use std::collections::HashMap;
use std::cmp::Reverse;

use chrono::{Local, NaiveDateTime};

use crate::model::UserRecord;

/// Every user the bot has heard from since the process started.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<i64, UserRecord>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one inbound event from `user_id`. Returns `true` when this was
    /// the first contact and a record had to be created.
    pub fn touch(&mut self, user_id: i64, username: Option<&str>, first_name: &str) -> bool {
        self.touch_at(user_id, username, first_name, Local::now().naive_local())
    }

    pub fn touch_at(
        &mut self,
        user_id: i64,
        username: Option<&str>,
        first_name: &str,
        now: NaiveDateTime,
    ) -> bool {
        let mut created = false;
        let record = self.users.entry(user_id).or_insert_with(|| {
            created = true;
            UserRecord::new(username, first_name, now)
        });
        record.messages_count += 1;
        created
    }

    pub fn lookup(&self, user_id: i64) -> Option<&UserRecord> {
        self.users.get(&user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &UserRecord)> {
        self.users.iter().map(|(id, record)| (*id, record))
    }

    pub fn ids(&self) -> Vec<i64> {
        self.users.keys().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.users.values().filter(|u| u.messages_count > 0).count()
    }

    /// Most recently joined users first, at most `limit` of them, together
    /// with how many were left out.
    pub fn recent(&self, limit: usize) -> (Vec<(i64, &UserRecord)>, usize) {
        let mut users: Vec<_> = self.iter().collect();
        users.sort_by_key(|(id, record)| Reverse((record.joined_at, *id)));
        let remaining = users.len().saturating_sub(limit);
        users.truncate(limit);
        (users, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_first_touch_creates_record() {
        let mut registry = UserRegistry::new();
        assert!(registry.touch(42, Some("alice"), "Alice"));

        let record = registry.lookup(42).unwrap();
        assert_eq!(record.messages_count, 1);
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.first_name, "Alice");
        assert_eq!(registry.ids(), vec![42]);
    }

    #[test]
    fn test_repeat_touch_increments_without_refreshing_profile() {
        let mut registry = UserRegistry::new();
        registry.touch_at(42, Some("alice"), "Alice", base_time());
        assert!(!registry.touch_at(42, Some("alice_new"), "Alicia", base_time() + Duration::hours(1)));
        assert!(!registry.touch(42, None, "Alicia"));

        let record = registry.lookup(42).unwrap();
        assert_eq!(record.messages_count, 3);
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.first_name, "Alice");
        assert_eq!(record.joined_at, base_time());
    }

    #[test]
    fn test_lookup_unknown_user() {
        let registry = UserRegistry::new();
        assert!(registry.lookup(7).is_none());
        assert!(registry.ids().is_empty());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_recent_orders_by_join_time_and_counts_rest() {
        let mut registry = UserRegistry::new();
        for i in 0..15 {
            registry.touch_at(i, None, &format!("user{i}"), base_time() + Duration::minutes(i));
        }

        let (recent, remaining) = registry.recent(10);
        let ids: Vec<i64> = recent.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![14, 13, 12, 11, 10, 9, 8, 7, 6, 5]);
        assert_eq!(remaining, 5);
    }

    #[test]
    fn test_recent_with_fewer_users_than_limit() {
        let mut registry = UserRegistry::new();
        registry.touch_at(1, None, "one", base_time());
        registry.touch_at(2, None, "two", base_time());

        let (recent, remaining) = registry.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].0, 2);
        assert_eq!(remaining, 0);
    }
}
