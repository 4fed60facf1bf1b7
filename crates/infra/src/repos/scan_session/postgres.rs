use super::IScanSessionRepo;
use chrono::{DateTime, Utc};
use deadliner_domain::{CandidateDeadline, ScanSession, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresScanSessionRepo {
    pool: PgPool,
}

impl PostgresScanSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScanSessionRaw {
    session_uid: Uuid,
    user_uid: Uuid,
    candidates: Json<Vec<CandidateDeadline>>,
    created: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<ScanSessionRaw> for ScanSession {
    fn from(raw: ScanSessionRaw) -> Self {
        Self {
            id: raw.session_uid.into(),
            user_id: raw.user_uid.into(),
            candidates: raw.candidates.0,
            created: raw.created,
            expires_at: raw.expires_at,
        }
    }
}

#[async_trait::async_trait]
impl IScanSessionRepo for PostgresScanSessionRepo {
    async fn insert(&self, session: &ScanSession) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scan_sessions
            (session_uid, user_uid, candidates, created, expires_at)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id.inner_ref())
        .bind(session.user_id.inner_ref())
        .bind(Json(&session.candidates))
        .bind(session.created)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, session: &ScanSession) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE scan_sessions
            SET candidates = $2
            WHERE session_uid = $1
            "#,
        )
        .bind(session.id.inner_ref())
        .bind(Json(&session.candidates))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, session_id: &ID) -> Option<ScanSession> {
        match sqlx::query_as::<_, ScanSessionRaw>(
            r#"
            SELECT * FROM scan_sessions AS s
            WHERE s.session_uid = $1
            "#,
        )
        .bind(session_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(session) => session.map(|s| s.into()),
            Err(e) => {
                error!("Unable to read scan session: {:?}. Err: {:?}", session_id, e);
                None
            }
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            DELETE FROM scan_sessions AS s
            WHERE s.expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }
}
