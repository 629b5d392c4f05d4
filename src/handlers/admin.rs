use std::collections::HashSet;

/// Allow-list of administrator ids, fixed at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminSet {
    ids: HashSet<i64>,
}

impl AdminSet {
    /// Parses a comma-separated id list. Blank and non-numeric entries are skipped.
    pub fn parse(admin_ids_str: &str) -> Self {
        let ids = admin_ids_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        Self { ids }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        // An empty list means nobody is an admin.
        !self.ids.is_empty() && self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<i64> for AdminSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
