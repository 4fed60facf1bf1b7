use super::document::{read_document, DocumentError, DocumentKind};
use crate::{
    error::DeadlinerError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use deadliner_api_structs::scan_document::*;
use deadliner_domain::{ScanSession, ID};
use deadliner_infra::DeadlinerContext;
use tracing::info;

impl From<UseCaseError> for DeadlinerError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyDocument => {
                DeadlinerError::BadClientData("The uploaded document does not contain any text".into())
            }
            UseCaseError::NoDeadlinesFound => DeadlinerError::UnprocessableEntity(
                "No deadlines found in the uploaded document".into(),
            ),
            UseCaseError::StorageError => DeadlinerError::InternalError,
        }
    }
}

fn handle_document_error(e: DocumentError) -> DeadlinerError {
    DeadlinerError::BadClientData(e.to_string())
}

pub async fn scan_document_controller(
    http_req: HttpRequest,
    body: web::Bytes,
    ctx: web::Data<DeadlinerContext>,
) -> Result<HttpResponse, DeadlinerError> {
    let user = protect_route(&http_req, &ctx).await?;

    let content_type = http_req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    let kind = DocumentKind::from_content_type(content_type).map_err(handle_document_error)?;
    let document_text = read_document(kind, body)
        .await
        .map_err(handle_document_error)?;

    let usecase = ScanDocumentUseCase {
        user_id: user.id,
        document_text,
    };

    execute(usecase, &ctx)
        .await
        .map(|session| HttpResponse::Created().json(APIResponse::new(session)))
        .map_err(DeadlinerError::from)
}

/// Extracts deadlines from a document and stages them in a new `ScanSession`
#[derive(Debug)]
pub struct ScanDocumentUseCase {
    pub user_id: ID,
    pub document_text: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyDocument,
    NoDeadlinesFound,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ScanDocumentUseCase {
    type Response = ScanSession;

    type Error = UseCaseError;

    const NAME: &'static str = "ScanDocument";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        if self.document_text.trim().is_empty() {
            return Err(UseCaseError::EmptyDocument);
        }

        let extracted = ctx.services.extractor.extract(&self.document_text).await;
        if extracted.is_empty() {
            return Err(UseCaseError::NoDeadlinesFound);
        }

        let session = ScanSession::new(self.user_id.clone(), extracted, ctx.sys.now());
        ctx.repos
            .scan_sessions
            .insert(&session)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        info!(
            session_id = %session.id,
            user_id = %self.user_id,
            candidates = session.candidates.len(),
            "Scan session created"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{setup_with_model, StaticTimeSys, StaticTextModel};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    const MODEL_OUTPUT: &str = r#"```json
[
    {"title": "Project report", "description": "Final report", "course": "CS101", "date": "2025-10-15", "priority": "high"},
    {"title": "Broken", "description": "No date"},
    {"title": "Quiz", "description": "Quiz 2", "date": "2025-10-20T09:00:00Z", "priority": "LOW"}
]
```"#;

    #[actix_web::main]
    #[test]
    async fn stages_extracted_deadlines() {
        let model = Arc::new(StaticTextModel::new(MODEL_OUTPUT));
        let (mut ctx, user) = setup_with_model(model.clone()).await;
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
        ctx.sys = Arc::new(StaticTimeSys(now.timestamp_millis()));

        let usecase = ScanDocumentUseCase {
            user_id: user.id.clone(),
            document_text: "Project report due October 15".into(),
        };
        let session = execute(usecase, &ctx).await.expect("To create session");

        assert_eq!(session.candidates.len(), 2);
        assert_eq!(session.expires_at, now + Duration::hours(1));
        assert_eq!(
            session.candidates[0].due_at,
            Utc.with_ymd_and_hms(2025, 10, 15, 23, 59, 0).unwrap()
        );
        assert!(ctx.repos.scan_sessions.find(&session.id).await.is_some());
        assert_eq!(model.calls(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn rejects_blank_documents_before_extraction() {
        let model = Arc::new(StaticTextModel::new(MODEL_OUTPUT));
        let (ctx, user) = setup_with_model(model.clone()).await;

        let usecase = ScanDocumentUseCase {
            user_id: user.id.clone(),
            document_text: " \n\t ".into(),
        };
        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::EmptyDocument);
        assert_eq!(model.calls(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn reports_documents_without_deadlines() {
        let model = Arc::new(StaticTextModel::new("[]"));
        let (ctx, user) = setup_with_model(model).await;

        let usecase = ScanDocumentUseCase {
            user_id: user.id.clone(),
            document_text: "Nothing due here".into(),
        };
        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NoDeadlinesFound);
    }
}
