use chrono::{DateTime, Utc};
use deadliner_domain::{Deadline, Priority, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeadlineDTO {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub course: Option<String>,
    pub due_at: DateTime<Utc>,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub completed: bool,
}

impl DeadlineDTO {
    pub fn new(deadline: Deadline) -> Self {
        Self {
            id: deadline.id,
            user_id: deadline.user_id,
            title: deadline.title,
            description: deadline.description,
            course: deadline.course,
            due_at: deadline.due_at,
            priority: deadline.priority,
            estimated_hours: deadline.estimated_hours,
            completed: deadline.completed,
        }
    }
}
