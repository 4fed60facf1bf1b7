use crate::dtos::NotificationStatsDTO;
use deadliner_domain::{LedgerStatistics, ID};
use serde::{Deserialize, Serialize};

pub mod send_deadline_notifications {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub message: String,
        pub stats: NotificationStatsDTO,
    }

    impl APIResponse {
        pub fn new(stats: NotificationStatsDTO) -> Self {
            Self {
                message: "Deadline notifications processed".into(),
                stats,
            }
        }
    }
}

pub mod send_daily_digest {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub message: String,
    }
}

pub mod send_test_notification {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub message: String,
    }
}

pub mod get_notification_statistics {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub total_notifications: i64,
        pub sent_notifications: i64,
        pub failed_notifications: i64,
    }

    impl APIResponse {
        pub fn new(stats: LedgerStatistics) -> Self {
            Self {
                total_notifications: stats.total,
                sent_notifications: stats.sent,
                failed_notifications: stats.failed(),
            }
        }
    }
}
