mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use deadliner_domain::{ScanSession, ID};
pub use inmemory::InMemoryScanSessionRepo;
pub use postgres::PostgresScanSessionRepo;

#[async_trait::async_trait]
pub trait IScanSessionRepo: Send + Sync {
    async fn insert(&self, session: &ScanSession) -> anyhow::Result<()>;
    /// Stores the current candidates of the session
    async fn save(&self, session: &ScanSession) -> anyhow::Result<()>;
    /// Finds a session regardless of owner and expiry, callers are expected
    /// to check `ScanSession::is_accessible_by`
    async fn find(&self, session_id: &ID) -> Option<ScanSession>;
    /// Deletes every session with `expires_at < now` and returns how many were deleted
    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use chrono::{Duration, TimeZone, Utc};
    use deadliner_domain::{ExtractedDeadline, Priority, ScanSession, ID};
    use std::collections::HashSet;

    fn extracted(title: &str) -> ExtractedDeadline {
        ExtractedDeadline {
            title: title.into(),
            description: "desc".into(),
            course: "General".into(),
            due_at: Utc.with_ymd_and_hms(2025, 10, 15, 23, 59, 0).unwrap(),
            priority: Priority::Low,
        }
    }

    #[tokio::test]
    async fn sweeps_only_sessions_expired_before_now() {
        let repos = Repos::create_inmemory();
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();

        // Expires one second before now, exactly now and one second after now
        let expired = ScanSession::new(
            ID::new(),
            vec![extracted("A")],
            now - ScanSession::ttl() - Duration::seconds(1),
        );
        let expires_now = ScanSession::new(ID::new(), vec![extracted("B")], now - ScanSession::ttl());
        let alive = ScanSession::new(
            ID::new(),
            vec![extracted("C")],
            now - ScanSession::ttl() + Duration::seconds(1),
        );
        for session in [&expired, &expires_now, &alive] {
            repos
                .scan_sessions
                .insert(session)
                .await
                .expect("To insert session");
        }

        let deleted = repos
            .scan_sessions
            .delete_expired(now)
            .await
            .expect("To sweep sessions");
        assert_eq!(deleted, 1);
        assert!(repos.scan_sessions.find(&expired.id).await.is_none());
        assert!(repos.scan_sessions.find(&expires_now.id).await.is_some());
        assert!(repos.scan_sessions.find(&alive.id).await.is_some());
    }

    #[tokio::test]
    async fn saves_remaining_candidates() {
        let repos = Repos::create_inmemory();
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        let mut session = ScanSession::new(ID::new(), vec![extracted("A"), extracted("B")], now);
        repos.scan_sessions.insert(&session).await.unwrap();

        let keys = [session.candidates[0].temp_key.clone()]
            .into_iter()
            .collect::<HashSet<_>>();
        session.remove_candidates(&keys);
        repos.scan_sessions.save(&session).await.unwrap();

        let stored = repos.scan_sessions.find(&session.id).await.unwrap();
        assert_eq!(stored.candidates.len(), 1);
        assert_eq!(stored.candidates[0].title, "B");
    }
}
