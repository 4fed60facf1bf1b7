use super::IScanSessionRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use deadliner_domain::{ScanSession, ID};

pub struct InMemoryScanSessionRepo {
    sessions: std::sync::Mutex<Vec<ScanSession>>,
}

impl InMemoryScanSessionRepo {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IScanSessionRepo for InMemoryScanSessionRepo {
    async fn insert(&self, session: &ScanSession) -> anyhow::Result<()> {
        insert(session, &self.sessions);
        Ok(())
    }

    async fn save(&self, session: &ScanSession) -> anyhow::Result<()> {
        save(session, &self.sessions);
        Ok(())
    }

    async fn find(&self, session_id: &ID) -> Option<ScanSession> {
        find(session_id, &self.sessions)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        Ok(delete_by(&self.sessions, |s| s.expires_at < now))
    }
}
