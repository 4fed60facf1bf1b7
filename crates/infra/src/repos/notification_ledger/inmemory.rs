use super::INotificationLedgerRepo;
use crate::repos::shared::inmemory_repo::*;
use deadliner_domain::{LedgerKey, LedgerStatistics, NotificationLedgerEntry};
use std::collections::HashSet;

pub struct InMemoryNotificationLedgerRepo {
    entries: std::sync::Mutex<Vec<NotificationLedgerEntry>>,
}

impl InMemoryNotificationLedgerRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl INotificationLedgerRepo for InMemoryNotificationLedgerRepo {
    async fn exists(&self, key: &LedgerKey) -> anyhow::Result<bool> {
        Ok(count_by(&self.entries, |e| e.key == *key) > 0)
    }

    async fn insert_many(&self, entries: &[NotificationLedgerEntry]) -> anyhow::Result<u64> {
        let mut ledger = self.entries.lock().unwrap();
        let mut keys = ledger.iter().map(|e| e.key.clone()).collect::<HashSet<_>>();
        let mut inserted = 0;
        for entry in entries {
            if keys.insert(entry.key.clone()) {
                ledger.push(entry.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn statistics(&self) -> anyhow::Result<LedgerStatistics> {
        Ok(LedgerStatistics {
            total: count_by(&self.entries, |_| true) as i64,
            sent: count_by(&self.entries, |e| e.sent) as i64,
        })
    }
}
