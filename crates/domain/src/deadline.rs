use crate::{
    scan::CandidateDeadline,
    shared::entity::{Entity, ID},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Case insensitive parse where any unknown word is treated as `Medium`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum InvalidPriorityError {
    #[error("Priority: {0} is not one of low, medium or high")]
    Unknown(String),
}

impl FromStr for Priority {
    type Err = InvalidPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(InvalidPriorityError::Unknown(s.to_string())),
        }
    }
}

/// A `Deadline` is a task owned by a `User` that has to be completed
/// before `due_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Deadline {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub description: Option<String>,
    pub course: Option<String>,
    pub due_at: DateTime<Utc>,
    pub priority: Priority,
    /// Estimated effort in hours, never negative
    pub estimated_hours: f64,
    /// Completed deadlines are never considered for notifications
    pub completed: bool,
    pub created: i64,
    pub updated: i64,
}

impl Deadline {
    pub fn new(
        user_id: ID,
        title: impl Into<String>,
        due_at: DateTime<Utc>,
        priority: Priority,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            user_id,
            title: title.into(),
            description: None,
            course: None,
            due_at,
            priority,
            estimated_hours: 0.0,
            completed: false,
            created: now_ms,
            updated: now_ms,
        }
    }

    /// Turns a confirmed scan candidate into a permanent `Deadline` for the given `User`
    pub fn from_candidate(candidate: &CandidateDeadline, user_id: ID, now_ms: i64) -> Self {
        let mut deadline = Self::new(
            user_id,
            candidate.title.clone(),
            candidate.due_at,
            candidate.priority,
            now_ms,
        );
        deadline.description = Some(candidate.description.clone());
        deadline.course = Some(candidate.course.clone());
        deadline
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at < now
    }

    /// Whole days the deadline is past due, zero if it is not overdue
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_overdue(now) {
            return 0;
        }
        (now - self.due_at).num_days()
    }
}

impl Entity for Deadline {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn parses_priorities_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::parse_lenient("urgent"), Priority::Medium);
    }

    #[test]
    fn counts_days_overdue() {
        let now = Utc.with_ymd_and_hms(2025, 10, 10, 12, 0, 0).unwrap();
        let deadline = Deadline::new(
            ID::new(),
            "Lab report",
            now - Duration::hours(50),
            Priority::High,
            0,
        );
        assert!(deadline.is_overdue(now));
        assert_eq!(deadline.days_overdue(now), 2);

        let upcoming = Deadline::new(ID::new(), "Quiz", now + Duration::hours(1), Priority::Low, 0);
        assert_eq!(upcoming.days_overdue(now), 0);
    }
}
