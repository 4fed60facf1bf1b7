use super::IDeadlineRepo;
use crate::repos::shared::inmemory_repo::*;
use deadliner_domain::{Deadline, ID};

pub struct InMemoryDeadlineRepo {
    deadlines: std::sync::Mutex<Vec<Deadline>>,
}

impl InMemoryDeadlineRepo {
    pub fn new() -> Self {
        Self {
            deadlines: std::sync::Mutex::new(vec![]),
        }
    }
}

fn by_due_at(mut deadlines: Vec<Deadline>) -> Vec<Deadline> {
    deadlines.sort_by_key(|d| d.due_at);
    deadlines
}

#[async_trait::async_trait]
impl IDeadlineRepo for InMemoryDeadlineRepo {
    async fn insert(&self, deadline: &Deadline) -> anyhow::Result<()> {
        insert(deadline, &self.deadlines);
        Ok(())
    }

    async fn find_open(&self) -> anyhow::Result<Vec<Deadline>> {
        Ok(by_due_at(find_by(&self.deadlines, |d| !d.completed)))
    }

    async fn find_open_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Deadline>> {
        Ok(by_due_at(find_by(&self.deadlines, |d| {
            !d.completed && d.user_id == *user_id
        })))
    }
}
