use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use deadliner_api_structs::get_scan_session::*;
use deadliner_domain::{ScanSession, ID};
use deadliner_infra::DeadlinerContext;

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

pub async fn get_scan_session_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    let user = protect_route(&http_req, &ctx).await?;

    let usecase = GetScanSessionUseCase {
        session_id: path_params.session_id.clone(),
        user_id: user.id,
    };

    execute(usecase, &ctx)
        .await
        .map(|session| HttpResponse::Ok().json(APIResponse::new(session)))
        .map_err(DeadlinerError::from)
}

#[derive(Debug)]
pub struct GetScanSessionUseCase {
    pub session_id: ID,
    pub user_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetScanSessionUseCase {
    type Response = ScanSession;

    type Error = UseCaseError;

    const NAME: &'static str = "GetScanSession";

    /// Missing, expired and foreign sessions all look the same to the caller
    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        match ctx.repos.scan_sessions.find(&self.session_id).await {
            Some(session) if session.is_accessible_by(&self.user_id, now) => Ok(session),
            _ => Err(UseCaseError::NotFound(self.session_id.clone())),
        }
    }
}
