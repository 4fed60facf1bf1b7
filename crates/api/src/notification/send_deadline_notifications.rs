use super::templates::{approaching_email, overdue_email};
use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_admin_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadliner_api_structs::dtos::NotificationStatsDTO;
use deadliner_api_structs::send_deadline_notifications::*;
use deadliner_domain::{
    approaching_horizon, classify, LedgerKey, NotificationLedgerEntry, NotificationTier, User, ID,
};
use deadliner_infra::DeadlinerContext;
use std::collections::HashMap;
use tracing::{error, info, warn};

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(_) => DeadlinerError::InternalError,
        }
    }
}

pub async fn send_deadline_notifications_controller(
    http_req: HttpRequest,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    protect_admin_route(&http_req, &ctx)?;

    execute(SendDeadlineNotificationsUseCase, &ctx)
        .await
        .map(|stats| HttpResponse::Ok().json(APIResponse::new(stats.into())))
        .map_err(DeadlinerError::from)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCycleStats {
    pub approaching_sent: u32,
    pub overdue_sent: u32,
    pub errors: u32,
}

impl From<NotificationCycleStats> for NotificationStatsDTO {
    fn from(stats: NotificationCycleStats) -> Self {
        Self {
            approaching_sent: stats.approaching_sent,
            overdue_sent: stats.overdue_sent,
            errors: stats.errors,
        }
    }
}

/// One pass of the notification engine over every open `Deadline`.
///
/// Uses a single `now` for the whole pass. Approaching tiers are sent at
/// most once per deadline and overdue notices at most once per UTC day,
/// which is enforced by the notification ledger. A failed delivery is
/// counted and left out of the ledger so that the next pass retries it.
/// Passes never overlap, they wait on `notification_lock`.
#[derive(Debug)]
pub struct SendDeadlineNotificationsUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDeadlineNotificationsUseCase {
    type Response = NotificationCycleStats;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDeadlineNotifications";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let _pass = ctx.notification_lock.lock().await;
        let now = ctx.sys.now();
        let horizon = now + approaching_horizon();
        let mut stats = NotificationCycleStats::default();

        let deadlines = ctx
            .repos
            .deadlines
            .find_open()
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;
        if deadlines.is_empty() {
            return Ok(stats);
        }

        let mut user_ids = deadlines.iter().map(|d| d.user_id.clone()).collect::<Vec<_>>();
        user_ids.sort_by_key(|id| *id.inner_ref());
        user_ids.dedup();
        let users = ctx
            .repos
            .users
            .find_many(&user_ids)
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect::<HashMap<ID, User>>();

        let mut staged = Vec::new();
        for deadline in &deadlines {
            let user = match users.get(&deadline.user_id) {
                Some(user) if user.is_active => user,
                Some(_) => continue,
                None => {
                    warn!(
                        deadline_id = %deadline.id,
                        user_id = %deadline.user_id,
                        "Deadline owner was not found, skipping"
                    );
                    continue;
                }
            };

            let tier = match classify(now, deadline.due_at) {
                Some(tier) if tier.is_approaching() && deadline.due_at >= horizon => continue,
                Some(tier) => tier,
                None => continue,
            };

            let key = LedgerKey::for_deadline(&deadline.id, tier, now);
            match ctx.repos.notification_ledger.exists(&key).await {
                Ok(false) => (),
                Ok(true) => continue,
                Err(e) => {
                    error!(deadline_id = %deadline.id, "Unable to read notification ledger: {:?}", e);
                    stats.errors += 1;
                    continue;
                }
            }

            let email = match tier {
                NotificationTier::Overdue => overdue_email(user, deadline, now),
                tier => approaching_email(user, deadline, tier, now),
            };
            if let Err(e) = ctx.services.email.send(&email).await {
                error!(
                    deadline_id = %deadline.id,
                    user_id = %user.id,
                    tier = %tier,
                    "Unable to deliver deadline notification: {:?}", e
                );
                stats.errors += 1;
                continue;
            }

            info!(
                deadline_id = %deadline.id,
                user_id = %user.id,
                tier = %tier,
                "Deadline notification sent"
            );
            if tier.is_approaching() {
                stats.approaching_sent += 1;
            } else {
                stats.overdue_sent += 1;
            }
            staged.push(NotificationLedgerEntry::for_deadline(
                &user.id,
                &deadline.id,
                &deadline.title,
                tier,
                now,
            ));
        }

        if !staged.is_empty() {
            if let Err(e) = ctx.repos.notification_ledger.insert_many(&staged).await {
                error!(
                    entries = staged.len(),
                    "Unable to record sent notifications in the ledger: {:?}", e
                );
                stats.errors += 1;
            }
        }

        info!(
            approaching_sent = stats.approaching_sent,
            overdue_sent = stats.overdue_sent,
            errors = stats.errors,
            "Deadline notification cycle finished"
        );
        Ok(stats)
    }
}
