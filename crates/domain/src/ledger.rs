use crate::{
    shared::entity::{Entity, ID},
    tier::NotificationTier,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Display;

/// What a ledger entry was sent for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Deadline(NotificationTier),
    DailyDigest,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deadline(tier) => tier.as_str(),
            Self::DailyDigest => "daily_digest",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniqueness key of a sent notification.
///
/// Approaching tiers are sent once ever per deadline, overdue notices and
/// digests once per UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    Approaching {
        deadline_id: ID,
        tier: NotificationTier,
    },
    Overdue {
        deadline_id: ID,
        day: NaiveDate,
    },
    DailyDigest {
        user_id: ID,
        day: NaiveDate,
    },
}

impl LedgerKey {
    pub fn for_deadline(deadline_id: &ID, tier: NotificationTier, now: DateTime<Utc>) -> Self {
        match tier {
            NotificationTier::Overdue => Self::Overdue {
                deadline_id: deadline_id.clone(),
                day: now.date_naive(),
            },
            tier => Self::Approaching {
                deadline_id: deadline_id.clone(),
                tier,
            },
        }
    }

    pub fn for_daily_digest(user_id: &ID, now: DateTime<Utc>) -> Self {
        Self::DailyDigest {
            user_id: user_id.clone(),
            day: now.date_naive(),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Approaching { tier, .. } => NotificationKind::Deadline(*tier),
            Self::Overdue { .. } => NotificationKind::Deadline(NotificationTier::Overdue),
            Self::DailyDigest { .. } => NotificationKind::DailyDigest,
        }
    }

    pub fn deadline_id(&self) -> Option<&ID> {
        match self {
            Self::Approaching { deadline_id, .. } | Self::Overdue { deadline_id, .. } => {
                Some(deadline_id)
            }
            Self::DailyDigest { .. } => None,
        }
    }

    pub fn window_day(&self) -> Option<NaiveDate> {
        match self {
            Self::Approaching { .. } => None,
            Self::Overdue { day, .. } | Self::DailyDigest { day, .. } => Some(*day),
        }
    }
}

/// String form stored in the unique `dedup_key` column
impl Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approaching { deadline_id, tier } => {
                write!(f, "deadline:{}:{}", deadline_id, tier)
            }
            Self::Overdue { deadline_id, day } => {
                write!(f, "deadline:{}:overdue:{}", deadline_id, day.format("%Y-%m-%d"))
            }
            Self::DailyDigest { user_id, day } => {
                write!(f, "user:{}:daily_digest:{}", user_id, day.format("%Y-%m-%d"))
            }
        }
    }
}

/// Append-only record of a notification that has been delivered
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationLedgerEntry {
    pub id: ID,
    pub user_id: ID,
    pub key: LedgerKey,
    pub message: String,
    pub sent: bool,
    pub created: DateTime<Utc>,
}

impl NotificationLedgerEntry {
    pub fn for_deadline(
        user_id: &ID,
        deadline_id: &ID,
        deadline_title: &str,
        tier: NotificationTier,
        now: DateTime<Utc>,
    ) -> Self {
        let message = match tier {
            NotificationTier::Overdue => {
                format!("Overdue deadline notification sent for: {}", deadline_title)
            }
            tier => format!(
                "Approaching deadline notification ({}) sent for: {}",
                tier, deadline_title
            ),
        };
        Self {
            id: Default::default(),
            user_id: user_id.clone(),
            key: LedgerKey::for_deadline(deadline_id, tier, now),
            message,
            sent: true,
            created: now,
        }
    }

    pub fn for_daily_digest(user_id: &ID, now: DateTime<Utc>) -> Self {
        let key = LedgerKey::for_daily_digest(user_id, now);
        Self {
            id: Default::default(),
            user_id: user_id.clone(),
            message: format!("Daily digest sent for {}", now.date_naive().format("%Y-%m-%d")),
            key,
            sent: true,
            created: now,
        }
    }

    pub fn dedup_key(&self) -> String {
        self.key.to_string()
    }

    pub fn deadline_id(&self) -> Option<&ID> {
        self.key.deadline_id()
    }

    pub fn kind(&self) -> NotificationKind {
        self.key.kind()
    }

    pub fn window_day(&self) -> Option<NaiveDate> {
        self.key.window_day()
    }
}

impl Entity for NotificationLedgerEntry {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStatistics {
    pub total: i64,
    pub sent: i64,
}

impl LedgerStatistics {
    pub fn failed(&self) -> i64 {
        self.total - self.sent
    }
}
