use super::templates::daily_digest_email;
use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_admin_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use deadliner_api_structs::send_daily_digest::*;
use deadliner_domain::{LedgerKey, NotificationLedgerEntry, User, ID};
use deadliner_infra::DeadlinerContext;
use tracing::{error, info};

/// Upcoming deadlines further out than this are left out of the digest
fn digest_window() -> Duration {
    Duration::days(7)
}

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(user_id) => DeadlinerError::NotFound(format!(
                "The user with id: {}, was not found.",
                user_id
            )),
            UseCaseError::EmailFailed | UseCaseError::StorageError(_) => DeadlinerError::InternalError,
        }
    }
}

pub async fn send_daily_digest_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SendDailyDigestUseCase {
        user_id: path.user_id.clone(),
    };
    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            HttpResponse::Ok().json(APIResponse {
                message: outcome.message().into(),
            })
        })
        .map_err(DeadlinerError::from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOutcome {
    Sent,
    NothingToReport,
    AlreadySent,
}

impl DigestOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Sent => "Daily digest sent",
            Self::NothingToReport => "No upcoming or overdue deadlines, digest not sent",
            Self::AlreadySent => "Daily digest was already sent today",
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    UserNotFound(ID),
    EmailFailed,
    StorageError(String),
}

/// Sends the digest of a single active `User`, at most once per UTC day
#[derive(Debug)]
pub struct SendDailyDigestUseCase {
    pub user_id: ID,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDailyDigestUseCase {
    type Response = DigestOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDailyDigest";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) if user.is_active => user,
            _ => return Err(UseCaseError::UserNotFound(self.user_id.clone())),
        };
        let _pass = ctx.notification_lock.lock().await;
        send_digest(ctx, &user, ctx.sys.now()).await
    }
}

async fn send_digest(
    ctx: &DeadlinerContext,
    user: &User,
    now: DateTime<Utc>,
) -> Result<DigestOutcome, UseCaseError> {
    let key = LedgerKey::for_daily_digest(&user.id, now);
    let already_sent = ctx
        .repos
        .notification_ledger
        .exists(&key)
        .await
        .map_err(|e| UseCaseError::StorageError(e.to_string()))?;
    if already_sent {
        return Ok(DigestOutcome::AlreadySent);
    }

    let window_end = now + digest_window();
    let (overdue, upcoming): (Vec<_>, Vec<_>) = ctx
        .repos
        .deadlines
        .find_open_by_user(&user.id)
        .await
        .map_err(|e| UseCaseError::StorageError(e.to_string()))?
        .into_iter()
        .filter(|d| d.due_at <= window_end)
        .partition(|d| d.due_at < now);

    if upcoming.is_empty() && overdue.is_empty() {
        return Ok(DigestOutcome::NothingToReport);
    }

    let email = daily_digest_email(user, &upcoming, &overdue, now);
    if let Err(e) = ctx.services.email.send(&email).await {
        error!(user_id = %user.id, "Unable to deliver daily digest: {:?}", e);
        return Err(UseCaseError::EmailFailed);
    }

    ctx.repos
        .notification_ledger
        .insert_many(&[NotificationLedgerEntry::for_daily_digest(&user.id, now)])
        .await
        .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

    info!(
        user_id = %user.id,
        upcoming = upcoming.len(),
        overdue = overdue.len(),
        "Daily digest sent"
    );
    Ok(DigestOutcome::Sent)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestRunStats {
    pub sent: u32,
    pub errors: u32,
}

/// Sends the daily digest to every active `User`. One failing user does
/// not stop the others. Holds `notification_lock` for the whole run.
#[derive(Debug)]
pub struct SendDailyDigestsUseCase;

#[async_trait::async_trait(?Send)]
impl UseCase for SendDailyDigestsUseCase {
    type Response = DigestRunStats;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDailyDigests";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let _pass = ctx.notification_lock.lock().await;
        let now = ctx.sys.now();
        let users = ctx
            .repos
            .users
            .find_active()
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        let mut stats = DigestRunStats::default();
        for user in &users {
            match send_digest(ctx, user, now).await {
                Ok(DigestOutcome::Sent) => stats.sent += 1,
                Ok(_) => (),
                Err(e) => {
                    error!(user_id = %user.id, "Daily digest failed: {:?}", e);
                    stats.errors += 1;
                }
            }
        }

        info!(
            users = users.len(),
            sent = stats.sent,
            errors = stats.errors,
            "Daily digest run finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{setup, with_mailer, StaticTimeSys};
    use chrono::TimeZone;
    use deadliner_domain::{Deadline, Priority};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap()
    }

    async fn insert_deadline(ctx: &DeadlinerContext, user: &User, title: &str, due_at: DateTime<Utc>) {
        let deadline = Deadline::new(user.id.clone(), title, due_at, Priority::High, 0);
        ctx.repos.deadlines.insert(&deadline).await.unwrap();
    }

    #[actix_web::main]
    #[test]
    async fn sends_digest_once_per_day() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);
        ctx.sys = Arc::new(StaticTimeSys(now().timestamp_millis()));
        insert_deadline(&ctx, &user, "Essay", now() + Duration::days(2)).await;
        insert_deadline(&ctx, &user, "Lab", now() - Duration::days(3)).await;
        insert_deadline(&ctx, &user, "Thesis", now() + Duration::days(30)).await;

        let usecase = SendDailyDigestUseCase {
            user_id: user.id.clone(),
        };
        assert_eq!(execute(usecase, &ctx).await.unwrap(), DigestOutcome::Sent);

        let sent = mailer.sent_to(&user.email);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text_body.contains("- Essay - Due in 2 days"));
        assert!(sent[0].text_body.contains("- Lab - 3 days overdue"));
        assert!(!sent[0].text_body.contains("Thesis"));

        let usecase = SendDailyDigestUseCase {
            user_id: user.id.clone(),
        };
        assert_eq!(
            execute(usecase, &ctx).await.unwrap(),
            DigestOutcome::AlreadySent
        );
        assert_eq!(mailer.sent().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn skips_users_without_deadlines() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);

        let usecase = SendDailyDigestUseCase {
            user_id: user.id.clone(),
        };
        assert_eq!(
            execute(usecase, &ctx).await.unwrap(),
            DigestOutcome::NothingToReport
        );
        assert!(mailer.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_unknown_users() {
        let (ctx, _) = setup().await;
        let usecase = SendDailyDigestUseCase { user_id: ID::new() };
        let res = execute(usecase, &ctx).await;
        assert!(matches!(res, Err(UseCaseError::UserNotFound(_))));
    }

    #[actix_web::main]
    #[test]
    async fn sends_to_all_active_users_and_isolates_failures() {
        let (mut ctx, user) = setup().await;
        let mailer = with_mailer(&mut ctx);
        ctx.sys = Arc::new(StaticTimeSys(now().timestamp_millis()));
        let other = User::new("grace@example.com", "Grace");
        ctx.repos.users.insert(&other).await.unwrap();
        insert_deadline(&ctx, &user, "Essay", now() + Duration::days(1)).await;
        insert_deadline(&ctx, &other, "Talk", now() + Duration::days(1)).await;

        mailer.fail_for(&user.email);
        let stats = execute(SendDailyDigestsUseCase, &ctx).await.unwrap();
        assert_eq!(stats, DigestRunStats { sent: 1, errors: 1 });

        mailer.recover(&user.email);
        let stats = execute(SendDailyDigestsUseCase, &ctx).await.unwrap();
        assert_eq!(stats, DigestRunStats { sent: 1, errors: 0 });
        assert_eq!(mailer.sent_to(&user.email).len(), 1);
        assert_eq!(mailer.sent_to(&other.email).len(), 1);
    }
}
