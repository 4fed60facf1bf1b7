use crate::{APIResponse, BaseClient};
use deadliner_api_structs::*;
use deadliner_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

/// Admin operations of the notification engine
#[derive(Clone)]
pub struct NotificationClient {
    base: Arc<BaseClient>,
}

impl NotificationClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn send_deadline_notifications(
        &self,
    ) -> APIResponse<send_deadline_notifications::APIResponse> {
        self.base
            .post((), "notifications/deadlines".into(), StatusCode::OK)
            .await
    }

    pub async fn send_daily_digest(
        &self,
        user_id: ID,
    ) -> APIResponse<send_daily_digest::APIResponse> {
        self.base
            .post(
                (),
                format!("notifications/daily-digest/{}", user_id),
                StatusCode::OK,
            )
            .await
    }

    /// Sends a reminder for the next open deadline of the user without
    /// recording it in the notification ledger
    pub async fn send_test_notification(
        &self,
        user_id: ID,
    ) -> APIResponse<send_test_notification::APIResponse> {
        self.base
            .post((), format!("notifications/test/{}", user_id), StatusCode::OK)
            .await
    }

    pub async fn statistics(&self) -> APIResponse<get_notification_statistics::APIResponse> {
        self.base
            .get("notifications/statistics".into(), StatusCode::OK)
            .await
    }
}
