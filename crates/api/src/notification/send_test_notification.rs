use super::templates::{approaching_email, overdue_email};
use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_admin_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadliner_api_structs::send_test_notification::*;
use deadliner_domain::{classify, NotificationTier, ID};
use deadliner_infra::DeadlinerContext;
use tracing::error;

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(_) => DeadlinerError::NotFound("User not found".into()),
            UseCaseError::NoOpenDeadlines => {
                DeadlinerError::NotFound("No active deadlines found for user".into())
            }
            UseCaseError::EmailFailed | UseCaseError::StorageError(_) => {
                DeadlinerError::InternalError
            }
        }
    }
}

pub async fn send_test_notification_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SendTestNotificationUseCase {
        user_id: path.user_id.clone(),
    };
    execute(usecase, &ctx)
        .await
        .map(|recipient| {
            HttpResponse::Ok().json(APIResponse {
                message: format!("Test notification sent to {}", recipient),
            })
        })
        .map_err(DeadlinerError::from)
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    UserNotFound(ID),
    NoOpenDeadlines,
    EmailFailed,
    StorageError(String),
}

/// Sends the reminder for the earliest open deadline of a `User` right away.
/// Nothing is written to the notification ledger, so the regular reminders
/// are unaffected. Responds with the recipient address.
#[derive(Debug)]
pub struct SendTestNotificationUseCase {
    pub user_id: ID,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendTestNotificationUseCase {
    type Response = String;

    type Error = UseCaseError;

    const NAME: &'static str = "SendTestNotification";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) => user,
            None => return Err(UseCaseError::UserNotFound(self.user_id.clone())),
        };

        let deadline = ctx
            .repos
            .deadlines
            .find_open_by_user(&user.id)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?
            .into_iter()
            .next()
            .ok_or(UseCaseError::NoOpenDeadlines)?;

        let now = ctx.sys.now();
        let email = match classify(now, deadline.due_at) {
            Some(NotificationTier::Overdue) => overdue_email(&user, &deadline, now),
            Some(tier) => approaching_email(&user, &deadline, tier, now),
            None => approaching_email(&user, &deadline, NotificationTier::ThreeDays, now),
        };
        if let Err(e) = ctx.services.email.send(&email).await {
            error!(user_id = %user.id, "Unable to deliver test notification: {:?}", e);
            return Err(UseCaseError::EmailFailed);
        }

        Ok(user.email)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{setup, with_mailer, StaticTimeSys};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use deadliner_domain::{Deadline, Priority, User};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 10, 0, 0).unwrap()
    }

    async fn insert_deadline(ctx: &DeadlinerContext, user: &User, title: &str, due_at: DateTime<Utc>) {
        let deadline = Deadline::new(user.id.clone(), title, due_at, Priority::High, 0);
        ctx.repos.deadlines.insert(&deadline).await.unwrap();
    }

    fn send_to(user: &User) -> SendTestNotificationUseCase {
        SendTestNotificationUseCase {
            user_id: user.id.clone(),
        }
    }

    #[actix_web::main]
    #[test]
    async fn sends_reminder_for_earliest_deadline_without_ledger_entry() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);
        ctx.sys = Arc::new(StaticTimeSys(now().timestamp_millis()));
        insert_deadline(&ctx, &user, "Thesis", now() + Duration::days(30)).await;
        insert_deadline(&ctx, &user, "Essay", now() + Duration::hours(25)).await;

        assert_eq!(execute(send_to(&user), &ctx).await.unwrap(), user.email);
        assert_eq!(execute(send_to(&user), &ctx).await.unwrap(), user.email);

        let sent = mailer.sent_to(&user.email);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "Deadline Reminder: Essay");
        assert_eq!(
            ctx.repos.notification_ledger.statistics().await.unwrap().total,
            0
        );
    }

    #[actix_web::main]
    #[test]
    async fn rejects_unknown_users_and_users_without_deadlines() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);

        let unknown = User::new("ghost@example.com", "Ghost");
        assert_eq!(
            execute(send_to(&unknown), &ctx).await.unwrap_err(),
            UseCaseError::UserNotFound(unknown.id.clone())
        );
        assert_eq!(
            execute(send_to(&user), &ctx).await.unwrap_err(),
            UseCaseError::NoOpenDeadlines
        );
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn reports_failed_delivery() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);
        ctx.sys = Arc::new(StaticTimeSys(now().timestamp_millis()));
        insert_deadline(&ctx, &user, "Lab", now() - Duration::hours(2)).await;

        mailer.fail_for(&user.email);
        assert_eq!(
            execute(send_to(&user), &ctx).await.unwrap_err(),
            UseCaseError::EmailFailed
        );

        mailer.recover(&user.email);
        execute(send_to(&user), &ctx).await.unwrap();
        assert_eq!(mailer.sent()[0].subject, "Overdue: Lab");
    }
}
