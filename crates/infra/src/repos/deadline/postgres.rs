use super::IDeadlineRepo;
use chrono::{DateTime, Utc};
use deadliner_domain::{Deadline, Priority, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresDeadlineRepo {
    pool: PgPool,
}

impl PostgresDeadlineRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeadlineRaw {
    deadline_uid: Uuid,
    user_uid: Uuid,
    title: String,
    description: Option<String>,
    course: Option<String>,
    due_at: DateTime<Utc>,
    priority: String,
    estimated_hours: f64,
    completed: bool,
    created: i64,
    updated: i64,
}

impl From<DeadlineRaw> for Deadline {
    fn from(raw: DeadlineRaw) -> Self {
        Self {
            id: raw.deadline_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            description: raw.description,
            course: raw.course,
            due_at: raw.due_at,
            priority: Priority::parse_lenient(&raw.priority),
            estimated_hours: raw.estimated_hours,
            completed: raw.completed,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

#[async_trait::async_trait]
impl IDeadlineRepo for PostgresDeadlineRepo {
    async fn insert(&self, deadline: &Deadline) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO deadlines
            (deadline_uid, user_uid, title, description, course, due_at, priority, estimated_hours, completed, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(deadline.id.inner_ref())
        .bind(deadline.user_id.inner_ref())
        .bind(&deadline.title)
        .bind(&deadline.description)
        .bind(&deadline.course)
        .bind(deadline.due_at)
        .bind(deadline.priority.as_str())
        .bind(deadline.estimated_hours)
        .bind(deadline.completed)
        .bind(deadline.created)
        .bind(deadline.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_open(&self) -> anyhow::Result<Vec<Deadline>> {
        let deadlines = sqlx::query_as::<_, DeadlineRaw>(
            r#"
            SELECT * FROM deadlines AS d
            WHERE NOT d.completed
            ORDER BY d.due_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(deadlines.into_iter().map(|d| d.into()).collect())
    }

    async fn find_open_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Deadline>> {
        let deadlines = sqlx::query_as::<_, DeadlineRaw>(
            r#"
            SELECT * FROM deadlines AS d
            WHERE d.user_uid = $1 AND NOT d.completed
            ORDER BY d.due_at
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(deadlines.into_iter().map(|d| d.into()).collect())
    }
}
