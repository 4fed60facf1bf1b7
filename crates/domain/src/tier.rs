use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Discrete urgency bucket that decides which reminder a `Deadline` gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTier {
    ThreeDays,
    OneDay,
    SameDay,
    OneHour,
    Overdue,
}

impl NotificationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeDays => "three_days",
            Self::OneDay => "one_day",
            Self::SameDay => "same_day",
            Self::OneHour => "one_hour",
            Self::Overdue => "overdue",
        }
    }

    pub fn is_approaching(&self) -> bool {
        !matches!(self, Self::Overdue)
    }
}

impl Display for NotificationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum InvalidTierError {
    #[error("Notification tier: {0} is not known")]
    Unknown(String),
}

impl FromStr for NotificationTier {
    type Err = InvalidTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "three_days" => Ok(Self::ThreeDays),
            "one_day" => Ok(Self::OneDay),
            "same_day" => Ok(Self::SameDay),
            "one_hour" => Ok(Self::OneHour),
            "overdue" => Ok(Self::Overdue),
            _ => Err(InvalidTierError::Unknown(s.to_string())),
        }
    }
}

/// How far ahead of `now` a deadline can be and still fall into an
/// approaching tier. Covers the whole `ThreeDays` window.
pub fn approaching_horizon() -> Duration {
    Duration::days(4)
}

/// Maps the time left until `due_at` onto a `NotificationTier`.
///
/// `days_until` is the whole-day part of the remaining time, so
/// `due_at = now + 73h` is three days out while `now + 50h` is two
/// days out and has no tier.
pub fn classify(now: DateTime<Utc>, due_at: DateTime<Utc>) -> Option<NotificationTier> {
    let time_until = due_at - now;
    let millis = time_until.num_milliseconds();

    if millis < 0 {
        return Some(NotificationTier::Overdue);
    }
    if millis == 0 {
        return None;
    }
    if millis <= Duration::hours(1).num_milliseconds() {
        return Some(NotificationTier::OneHour);
    }

    match time_until.num_days() {
        0 => Some(NotificationTier::SameDay),
        1 => Some(NotificationTier::OneDay),
        3 => Some(NotificationTier::ThreeDays),
        _ => None,
    }
}
