mod inmemory;
mod postgres;

use deadliner_domain::{LedgerKey, LedgerStatistics, NotificationLedgerEntry};
pub use inmemory::InMemoryNotificationLedgerRepo;
pub use postgres::PostgresNotificationLedgerRepo;

/// Append-only log of sent notifications. Entries are never updated or removed.
#[async_trait::async_trait]
pub trait INotificationLedgerRepo: Send + Sync {
    async fn exists(&self, key: &LedgerKey) -> anyhow::Result<bool>;
    /// Appends all entries in one transaction. Entries whose key is already
    /// in the ledger are skipped. Returns the number of appended entries.
    async fn insert_many(&self, entries: &[NotificationLedgerEntry]) -> anyhow::Result<u64>;
    async fn statistics(&self) -> anyhow::Result<LedgerStatistics>;
}
