use crate::{
    deadline::Priority,
    shared::entity::{Entity, ID},
};
use chrono::{DateTime, Duration, Utc};
use deadliner_utils::create_random_key;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A deadline found in a document before the owner has confirmed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDeadline {
    pub title: String,
    pub description: String,
    pub course: String,
    pub due_at: DateTime<Utc>,
    pub priority: Priority,
}

/// An `ExtractedDeadline` staged in a `ScanSession`. The `temp_key` is how
/// the owner refers to it when committing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDeadline {
    pub temp_key: String,
    pub title: String,
    pub description: String,
    pub course: String,
    pub due_at: DateTime<Utc>,
    pub priority: Priority,
}

impl CandidateDeadline {
    fn new(extracted: ExtractedDeadline, temp_key: String) -> Self {
        Self {
            temp_key,
            title: extracted.title,
            description: extracted.description,
            course: extracted.course,
            due_at: extracted.due_at,
            priority: extracted.priority,
        }
    }
}

/// Time-boxed staging area holding the candidates of one uploaded document
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSession {
    pub id: ID,
    pub user_id: ID,
    pub candidates: Vec<CandidateDeadline>,
    pub created: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ScanSession {
    pub fn ttl() -> Duration {
        Duration::hours(1)
    }

    pub fn new(user_id: ID, extracted: Vec<ExtractedDeadline>, now: DateTime<Utc>) -> Self {
        let mut used_keys = HashSet::with_capacity(extracted.len());
        let candidates = extracted
            .into_iter()
            .map(|e| {
                let mut key = create_random_key("tk", 12);
                while used_keys.contains(&key) {
                    key = create_random_key("tk", 12);
                }
                used_keys.insert(key.clone());
                CandidateDeadline::new(e, key)
            })
            .collect();

        Self {
            id: Default::default(),
            user_id,
            candidates,
            created: now,
            expires_at: now + Self::ttl(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Only the owner can read or commit a session, and only before it expires
    pub fn is_accessible_by(&self, user_id: &ID, now: DateTime<Utc>) -> bool {
        &self.user_id == user_id && !self.is_expired(now)
    }

    /// Candidates whose key is in `selected_keys`, in session order.
    /// Keys that match nothing are ignored.
    pub fn select(&self, selected_keys: &HashSet<String>) -> Vec<CandidateDeadline> {
        self.candidates
            .iter()
            .filter(|c| selected_keys.contains(&c.temp_key))
            .cloned()
            .collect()
    }

    /// Drops the candidates with the given keys so that they cannot be committed twice
    pub fn remove_candidates(&mut self, keys: &HashSet<String>) {
        self.candidates.retain(|c| !keys.contains(&c.temp_key));
    }
}

impl Entity for ScanSession {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn extracted(title: &str) -> ExtractedDeadline {
        ExtractedDeadline {
            title: title.into(),
            description: format!("{} description", title),
            course: "General".into(),
            due_at: Utc.with_ymd_and_hms(2025, 10, 15, 23, 59, 0).unwrap(),
            priority: Priority::Medium,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn tags_every_candidate_with_unique_key() {
        let session = ScanSession::new(
            ID::new(),
            vec![extracted("A"), extracted("B"), extracted("C")],
            now(),
        );
        let keys = session
            .candidates
            .iter()
            .map(|c| c.temp_key.clone())
            .collect::<HashSet<_>>();
        assert_eq!(keys.len(), 3);
        assert_eq!(session.expires_at, now() + Duration::hours(1));
    }

    #[test]
    fn expires_exactly_at_expiry() {
        let user_id = ID::new();
        let session = ScanSession::new(user_id.clone(), vec![extracted("A")], now());
        let almost = now() + Duration::minutes(59) + Duration::seconds(59);
        assert!(session.is_accessible_by(&user_id, almost));
        assert!(session.is_expired(session.expires_at));
        assert!(!session.is_accessible_by(&user_id, session.expires_at));
    }

    #[test]
    fn is_not_accessible_by_other_users() {
        let session = ScanSession::new(ID::new(), vec![extracted("A")], now());
        assert!(!session.is_accessible_by(&ID::new(), now()));
    }

    #[test]
    fn selects_known_keys_and_ignores_unknown() {
        let mut session = ScanSession::new(
            ID::new(),
            vec![extracted("A"), extracted("B"), extracted("C")],
            now(),
        );
        let mut keys = HashSet::new();
        keys.insert(session.candidates[2].temp_key.clone());
        keys.insert(session.candidates[0].temp_key.clone());
        keys.insert("tk_doesnotexist".to_string());

        let selected = session.select(&keys);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title, "A");
        assert_eq!(selected[1].title, "C");

        session.remove_candidates(&keys);
        assert_eq!(session.candidates.len(), 1);
        assert_eq!(session.candidates[0].title, "B");
        assert!(session.select(&keys).is_empty());
    }
}
