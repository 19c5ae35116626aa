// user store protocol:
// users: lower-cased name -> User { display name, interest set }
// index: interest token -> lower-cased names holding it
//
// every (user, interest) pair appears in both maps or in neither

use super::normalize_interests;
use crate::error::{Field, MatchError};
use crate::records::Record;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub interests: BTreeSet<String>,
}

/// Outcome of [`UserStore::load`].
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub rejected: Vec<MatchError>,
}

#[derive(Clone, Debug, Default)]
pub struct UserStore {
    users: BTreeMap<String, User>,
    index: HashMap<String, BTreeSet<String>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the store contents with `records`.
    ///
    /// Rows with an empty name or no usable interest are skipped and reported
    /// in the summary. A name seen twice keeps the later row.
    pub fn load<'a, I>(&mut self, records: I) -> LoadSummary
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.users.clear();
        self.index.clear();

        let mut rejected = vec![];
        for (i, record) in records.into_iter().enumerate() {
            let row = i + 1;
            let name = record.name.trim();
            if name.is_empty() {
                rejected.push(MatchError::MalformedRecord {
                    row,
                    field: Field::Name,
                });
                continue;
            }
            let interests = normalize_interests(&record.interests);
            if interests.is_empty() {
                rejected.push(MatchError::MalformedRecord {
                    row,
                    field: Field::Interests,
                });
                continue;
            }
            self.insert(User {
                name: name.to_string(),
                interests,
            });
        }

        info!(
            "user store loaded {} users, {} records rejected",
            self.users.len(),
            rejected.len()
        );
        LoadSummary {
            loaded: self.users.len(),
            rejected,
        }
    }

    fn insert(&mut self, user: User) {
        let key = user.name.to_lowercase();
        for interest in user.interests.iter() {
            self.index
                .entry(interest.clone())
                .or_default()
                .insert(key.clone());
        }
        if let Some(old) = self.users.insert(key.clone(), user) {
            debug!("user store replaced duplicate user: {}", old.name);
            let current = &self.users[&key].interests;
            for interest in old.interests.difference(current) {
                if let Some(holders) = self.index.get_mut(interest) {
                    holders.remove(&key);
                    if holders.is_empty() {
                        self.index.remove(interest);
                    }
                }
            }
        }
    }

    /// Every user holding at least one of `interests`.
    pub fn candidate_users(&self, interests: &BTreeSet<String>) -> BTreeSet<&str> {
        interests
            .iter()
            .filter_map(|interest| self.index.get(interest))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&User> {
        self.users.get(key)
    }

    /// Users keyed by lower-cased name, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &User)> {
        self.users.iter().map(|(k, u)| (k.as_str(), u))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn holders(&self, interest: &str) -> Option<&BTreeSet<String>> {
        self.index.get(interest)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(&str, &str)]) -> Vec<Record> {
        rows.iter().map(|(n, i)| Record::new(*n, *i)).collect()
    }

    fn assert_consistent(store: &UserStore) {
        for (key, user) in store.iter() {
            for interest in user.interests.iter() {
                assert!(store.holders(interest).unwrap().contains(key));
            }
        }
        for (interest, holders) in store.index.iter() {
            assert!(!holders.is_empty());
            for key in holders {
                assert!(store.get(key).unwrap().interests.contains(interest));
            }
        }
    }

    #[test]
    fn load_normalizes_interests() {
        let mut store = UserStore::new();
        let summary = store.load(&records(&[("Alice", " Python, ML ,python,,")]));
        assert_eq!(summary.loaded, 1);
        assert!(summary.rejected.is_empty());

        let alice = store.get("alice").unwrap();
        assert_eq!(alice.name, "Alice");
        let interests: Vec<_> = alice.interests.iter().map(String::as_str).collect();
        assert_eq!(interests, ["ml", "python"]);
        assert_consistent(&store);
    }

    #[test]
    fn load_skips_malformed_records() {
        let mut store = UserStore::new();
        let summary = store.load(&records(&[
            ("alice", "python"),
            ("bob", ""),
            ("  ", "css"),
            ("carol", " , ,"),
            ("dave", "sql"),
        ]));
        assert_eq!(summary.loaded, 2);
        assert_eq!(store.len(), 2);
        assert!(matches!(
            summary.rejected[..],
            [
                MatchError::MalformedRecord { row: 2, field: Field::Interests },
                MatchError::MalformedRecord { row: 3, field: Field::Name },
                MatchError::MalformedRecord { row: 4, field: Field::Interests },
            ]
        ));
    }

    #[test]
    fn load_replaces_previous_state() {
        let mut store = UserStore::new();
        store.load(&records(&[("alice", "python"), ("bob", "css")]));
        store.load(&records(&[("carol", "ml")]));

        assert_eq!(store.keys().collect::<Vec<_>>(), ["carol"]);
        assert!(store.holders("python").is_none());
        assert!(store.holders("css").is_none());
        assert_consistent(&store);
    }

    #[test]
    fn duplicate_names_keep_the_later_row() {
        let mut store = UserStore::new();
        let summary = store.load(&records(&[("Alice", "python,ml"), ("ALICE", "ml,css")]));
        assert_eq!(summary.loaded, 1);

        let alice = store.get("alice").unwrap();
        assert_eq!(alice.name, "ALICE");
        assert!(store.holders("python").is_none());
        assert_consistent(&store);
    }

    #[test]
    fn candidate_users_is_union_of_index_entries() {
        let mut store = UserStore::new();
        store.load(&records(&[
            ("alice", "python,ml"),
            ("bob", "python,css"),
            ("carol", "ml,css"),
            ("dave", "sql"),
        ]));
        let wanted: BTreeSet<String> = ["python".to_string(), "rust".to_string()].into();
        let candidates: Vec<_> = store.candidate_users(&wanted).into_iter().collect();
        assert_eq!(candidates, ["alice", "bob"]);

        assert!(store.candidate_users(&BTreeSet::new()).is_empty());
    }
}
