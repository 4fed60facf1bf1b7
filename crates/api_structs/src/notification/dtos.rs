use serde::{Deserialize, Serialize};

/// Outcome of one notification engine cycle
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationStatsDTO {
    pub approaching_sent: u32,
    pub overdue_sent: u32,
    pub errors: u32,
}
