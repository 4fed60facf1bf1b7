mod inmemory;
mod postgres;

use deadliner_domain::{User, ID};
pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>>;
    async fn find_active(&self) -> anyhow::Result<Vec<User>>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use deadliner_domain::{User, ID};

    #[tokio::test]
    async fn finds_many_and_active_users() {
        let repos = Repos::create_inmemory();
        let alice = User::new("alice@example.com", "alice");
        let mut bob = User::new("bob@example.com", "bob");
        bob.is_active = false;
        repos.users.insert(&alice).await.expect("To insert user");
        repos.users.insert(&bob).await.expect("To insert user");

        let users = repos
            .users
            .find_many(&[alice.id.clone(), bob.id.clone(), ID::new()])
            .await
            .expect("To find users");
        assert_eq!(users.len(), 2);

        let active = repos.users.find_active().await.expect("To find users");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, alice.id);

        assert!(!repos.users.find(&bob.id).await.unwrap().is_active);
    }
}
