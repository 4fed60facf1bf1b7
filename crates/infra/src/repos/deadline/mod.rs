mod inmemory;
mod postgres;

use deadliner_domain::{Deadline, ID};
pub use inmemory::InMemoryDeadlineRepo;
pub use postgres::PostgresDeadlineRepo;

#[async_trait::async_trait]
pub trait IDeadlineRepo: Send + Sync {
    async fn insert(&self, deadline: &Deadline) -> anyhow::Result<()>;
    /// All deadlines that are not completed, ordered by `due_at`
    async fn find_open(&self) -> anyhow::Result<Vec<Deadline>>;
    async fn find_open_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Deadline>>;
}
