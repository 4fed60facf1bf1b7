use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadliner_api_structs::commit_scan_session::*;
use deadliner_domain::{Deadline, ID};
use deadliner_infra::DeadlinerContext;
use std::collections::HashSet;
use tracing::{error, info};

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(session_id) => DeadlinerError::NotFound(format!(
                "The scan session with id: {}, was not found or has expired.",
                session_id
            )),
        }
    }
}

pub async fn commit_scan_session_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    let user = protect_route(&http_req, &ctx).await?;

    let body = body.into_inner();
    let usecase = CommitScanSessionUseCase {
        session_id: body.session_id,
        user_id: user.id,
        selected_keys: body.selected_keys.into_iter().collect(),
    };

    execute(usecase, &ctx)
        .await
        .map(|deadlines| HttpResponse::Created().json(APIResponse::new(deadlines)))
        .map_err(DeadlinerError::from)
}

/// Turns the selected candidates of a `ScanSession` into `Deadline`s.
///
/// Unknown keys are ignored. A candidate that cannot be stored is skipped
/// without affecting the others. Committed candidates are removed from the
/// session so that they cannot be committed twice.
#[derive(Debug)]
pub struct CommitScanSessionUseCase {
    pub session_id: ID,
    pub user_id: ID,
    pub selected_keys: HashSet<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for CommitScanSessionUseCase {
    type Response = Vec<Deadline>;

    type Error = UseCaseError;

    const NAME: &'static str = "CommitScanSession";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let mut session = match ctx.repos.scan_sessions.find(&self.session_id).await {
            Some(session) if session.is_accessible_by(&self.user_id, now) => session,
            _ => return Err(UseCaseError::NotFound(self.session_id.clone())),
        };

        let mut created = Vec::new();
        let mut committed_keys = HashSet::new();
        for candidate in session.select(&self.selected_keys) {
            let deadline =
                Deadline::from_candidate(&candidate, self.user_id.clone(), now.timestamp_millis());
            match ctx.repos.deadlines.insert(&deadline).await {
                Ok(_) => {
                    committed_keys.insert(candidate.temp_key);
                    created.push(deadline);
                }
                Err(e) => error!(
                    temp_key = %candidate.temp_key,
                    "Unable to store committed candidate: {:?}", e
                ),
            }
        }

        if !committed_keys.is_empty() {
            session.remove_candidates(&committed_keys);
            if let Err(e) = ctx.repos.scan_sessions.save(&session).await {
                error!(
                    session_id = %session.id,
                    "Unable to remove committed candidates from scan session: {:?}", e
                );
            }
        }

        info!(
            session_id = %session.id,
            user_id = %self.user_id,
            count = created.len(),
            "Scan session committed"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{setup, StaticTimeSys};
    use chrono::{TimeZone, Utc};
    use deadliner_domain::{ExtractedDeadline, Priority, ScanSession};
    use deadliner_infra::IDeadlineRepo;
    use std::sync::Arc;

    fn extracted(title: &str) -> ExtractedDeadline {
        ExtractedDeadline {
            title: title.into(),
            description: format!("{} description", title),
            course: "General".into(),
            due_at: Utc.with_ymd_and_hms(2025, 10, 15, 23, 59, 0).unwrap(),
            priority: Priority::High,
        }
    }

    struct FailingDeadlineRepo {
        inner: Arc<dyn IDeadlineRepo>,
        failing_title: String,
    }

    #[async_trait::async_trait]
    impl IDeadlineRepo for FailingDeadlineRepo {
        async fn insert(&self, deadline: &Deadline) -> anyhow::Result<()> {
            if deadline.title == self.failing_title {
                anyhow::bail!("Connection reset");
            }
            self.inner.insert(deadline).await
        }
        async fn find_open(&self) -> anyhow::Result<Vec<Deadline>> {
            self.inner.find_open().await
        }
        async fn find_open_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Deadline>> {
            self.inner.find_open_by_user(user_id).await
        }
    }

    async fn staged_session(ctx: &mut DeadlinerContext, user_id: &ID) -> ScanSession {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        ctx.sys = Arc::new(StaticTimeSys(now.timestamp_millis()));
        let session = ScanSession::new(
            user_id.clone(),
            vec![extracted("A"), extracted("B"), extracted("C")],
            now,
        );
        ctx.repos.scan_sessions.insert(&session).await.unwrap();
        session
    }

    #[actix_web::main]
    #[test]
    async fn commits_selected_candidates_and_ignores_unknown_keys() {
        let (mut ctx, user) = setup().await;
        let session = staged_session(&mut ctx, &user.id).await;

        let selected_keys = vec![
            session.candidates[0].temp_key.clone(),
            session.candidates[2].temp_key.clone(),
            "tk_unknown".to_string(),
        ];
        let usecase = CommitScanSessionUseCase {
            session_id: session.id.clone(),
            user_id: user.id.clone(),
            selected_keys: selected_keys.iter().cloned().collect(),
        };
        let deadlines = execute(usecase, &ctx).await.expect("To commit");
        assert_eq!(deadlines.len(), 2);
        assert_eq!(deadlines[0].title, "A");
        assert_eq!(deadlines[0].user_id, user.id);
        assert_eq!(deadlines[0].course.as_deref(), Some("General"));
        assert_eq!(
            deadlines[0].due_at,
            Utc.with_ymd_and_hms(2025, 10, 15, 23, 59, 0).unwrap()
        );
        assert_eq!(deadlines[1].title, "C");
        assert_eq!(
            ctx.repos.deadlines.find_open_by_user(&user.id).await.unwrap().len(),
            2
        );

        // Committing the same keys again creates nothing
        let usecase = CommitScanSessionUseCase {
            session_id: session.id.clone(),
            user_id: user.id.clone(),
            selected_keys: selected_keys.into_iter().collect(),
        };
        assert!(execute(usecase, &ctx).await.unwrap().is_empty());
        let remaining = ctx.repos.scan_sessions.find(&session.id).await.unwrap();
        assert_eq!(remaining.candidates.len(), 1);
        assert_eq!(remaining.candidates[0].title, "B");
    }

    #[actix_web::main]
    #[test]
    async fn isolates_candidates_that_cannot_be_stored() {
        let (mut ctx, user) = setup().await;
        ctx.repos.deadlines = Arc::new(FailingDeadlineRepo {
            inner: ctx.repos.deadlines.clone(),
            failing_title: "B".into(),
        });
        let session = staged_session(&mut ctx, &user.id).await;

        let usecase = CommitScanSessionUseCase {
            session_id: session.id.clone(),
            user_id: user.id.clone(),
            selected_keys: session.candidates.iter().map(|c| c.temp_key.clone()).collect(),
        };
        let deadlines = execute(usecase, &ctx).await.expect("To commit");
        assert_eq!(
            deadlines.iter().map(|d| d.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "C"]
        );

        // The failed candidate can still be committed later
        let remaining = ctx.repos.scan_sessions.find(&session.id).await.unwrap();
        assert_eq!(remaining.candidates.len(), 1);
        assert_eq!(remaining.candidates[0].title, "B");
    }

    #[actix_web::main]
    #[test]
    async fn rejects_expired_and_foreign_sessions() {
        let (mut ctx, user) = setup().await;
        let session = staged_session(&mut ctx, &user.id).await;
        let commit = |user_id: &ID| CommitScanSessionUseCase {
            session_id: session.id.clone(),
            user_id: user_id.clone(),
            selected_keys: session.candidates.iter().map(|c| c.temp_key.clone()).collect(),
        };

        let res = execute(commit(&ID::new()), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NotFound(session.id.clone()));

        // Expiry is inclusive
        ctx.sys = Arc::new(StaticTimeSys(session.expires_at.timestamp_millis()));
        let res = execute(commit(&user.id), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NotFound(session.id.clone()));
        assert!(ctx
            .repos
            .deadlines
            .find_open_by_user(&user.id)
            .await
            .unwrap()
            .is_empty());
    }
}
