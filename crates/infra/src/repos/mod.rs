mod deadline;
mod notification_ledger;
mod scan_session;
mod shared;
mod user;

pub use deadline::IDeadlineRepo;
use deadline::{InMemoryDeadlineRepo, PostgresDeadlineRepo};
pub use notification_ledger::INotificationLedgerRepo;
use notification_ledger::{InMemoryNotificationLedgerRepo, PostgresNotificationLedgerRepo};
pub use scan_session::IScanSessionRepo;
use scan_session::{InMemoryScanSessionRepo, PostgresScanSessionRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub deadlines: Arc<dyn IDeadlineRepo>,
    pub scan_sessions: Arc<dyn IScanSessionRepo>,
    pub notification_ledger: Arc<dyn INotificationLedgerRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB RUNNING MIGRATIONS ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB RUNNING MIGRATIONS ... [done]");

        Ok(Self {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            deadlines: Arc::new(PostgresDeadlineRepo::new(pool.clone())),
            scan_sessions: Arc::new(PostgresScanSessionRepo::new(pool.clone())),
            notification_ledger: Arc::new(PostgresNotificationLedgerRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            deadlines: Arc::new(InMemoryDeadlineRepo::new()),
            scan_sessions: Arc::new(InMemoryScanSessionRepo::new()),
            notification_ledger: Arc::new(InMemoryNotificationLedgerRepo::new()),
        }
    }
}
