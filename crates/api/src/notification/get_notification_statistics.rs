use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_admin_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadliner_api_structs::get_notification_statistics::*;
use deadliner_domain::LedgerStatistics;
use deadliner_infra::DeadlinerContext;

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(_) => DeadlinerError::InternalError,
        }
    }
}

pub async fn get_notification_statistics_controller(
    http_req: HttpRequest,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    protect_admin_route(&http_req, &ctx)?;

    execute(GetNotificationStatisticsUseCase, &ctx)
        .await
        .map(|stats| HttpResponse::Ok().json(APIResponse::new(stats)))
        .map_err(DeadlinerError::from)
}

#[derive(Debug)]
pub struct GetNotificationStatisticsUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetNotificationStatisticsUseCase {
    type Response = LedgerStatistics;

    type Error = UseCaseError;

    const NAME: &'static str = "GetNotificationStatistics";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .notification_ledger
            .statistics()
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::setup;
    use chrono::Utc;
    use deadliner_domain::{NotificationLedgerEntry, NotificationTier, ID};

    #[actix_web::main]
    #[test]
    async fn counts_ledger_entries() {
        let (ctx, user) = setup().await;
        let stats = execute(GetNotificationStatisticsUseCase, &ctx).await.unwrap();
        assert_eq!(stats, LedgerStatistics::default());

        let now = Utc::now();
        let entries = vec![
            NotificationLedgerEntry::for_deadline(
                &user.id,
                &ID::new(),
                "Essay",
                NotificationTier::OneDay,
                now,
            ),
            NotificationLedgerEntry::for_daily_digest(&user.id, now),
        ];
        ctx.repos.notification_ledger.insert_many(&entries).await.unwrap();

        let stats = execute(GetNotificationStatisticsUseCase, &ctx).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.failed(), 0);
    }
}
