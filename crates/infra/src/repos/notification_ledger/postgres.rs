use super::INotificationLedgerRepo;
use deadliner_domain::{LedgerKey, LedgerStatistics, NotificationLedgerEntry};
use sqlx::{FromRow, PgPool};

pub struct PostgresNotificationLedgerRepo {
    pool: PgPool,
}

impl PostgresNotificationLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LedgerStatisticsRaw {
    total: i64,
    sent: i64,
}

#[async_trait::async_trait]
impl INotificationLedgerRepo for PostgresNotificationLedgerRepo {
    async fn exists(&self, key: &LedgerKey) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notification_ledger AS n
                WHERE n.dedup_key = $1
            )
            "#,
        )
        .bind(key.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_many(&self, entries: &[NotificationLedgerEntry]) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for entry in entries {
            let res = sqlx::query(
                r#"
                INSERT INTO notification_ledger
                (entry_uid, user_uid, deadline_uid, kind, window_day, message, sent, created, dedup_key)
                VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (dedup_key) DO NOTHING
                "#,
            )
            .bind(entry.id.inner_ref())
            .bind(entry.user_id.inner_ref())
            .bind(entry.deadline_id().map(|id| *id.inner_ref()))
            .bind(entry.kind().as_str())
            .bind(entry.window_day())
            .bind(&entry.message)
            .bind(entry.sent)
            .bind(entry.created)
            .bind(entry.dedup_key())
            .execute(&mut *tx)
            .await?;
            inserted += res.rows_affected();
        }
        tx.commit().await?;

        Ok(inserted)
    }

    async fn statistics(&self) -> anyhow::Result<LedgerStatistics> {
        let stats = sqlx::query_as::<_, LedgerStatisticsRaw>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE n.sent) AS sent
            FROM notification_ledger AS n
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerStatistics {
            total: stats.total,
            sent: stats.sent,
        })
    }
}
