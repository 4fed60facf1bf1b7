use chrono::{DateTime, Utc};
use deadliner_domain::{CandidateDeadline, Priority};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CandidateDeadlineDTO {
    pub temp_key: String,
    pub title: String,
    pub description: String,
    pub course: String,
    pub date: DateTime<Utc>,
    pub priority: Priority,
}

impl CandidateDeadlineDTO {
    pub fn new(candidate: CandidateDeadline) -> Self {
        Self {
            temp_key: candidate.temp_key,
            title: candidate.title,
            description: candidate.description,
            course: candidate.course,
            date: candidate.due_at,
            priority: candidate.priority,
        }
    }
}
