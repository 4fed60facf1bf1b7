use crate::{APIResponse, BaseClient};
use deadliner_api_structs::*;
use deadliner_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ScanClient {
    base: Arc<BaseClient>,
}

pub struct ScanDocumentInput {
    pub content: Vec<u8>,
    /// `application/pdf`, `text/plain` or `text/csv`
    pub content_type: String,
}

pub struct CommitScanSessionInput {
    pub session_id: ID,
    pub selected_keys: Vec<String>,
}

impl ScanClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn scan(&self, input: ScanDocumentInput) -> APIResponse<scan_document::APIResponse> {
        self.base
            .post_bytes(
                input.content,
                &input.content_type,
                "scan".into(),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get_session(
        &self,
        session_id: ID,
    ) -> APIResponse<get_scan_session::APIResponse> {
        self.base
            .get(format!("scan/{}", session_id), StatusCode::OK)
            .await
    }

    pub async fn commit(
        &self,
        input: CommitScanSessionInput,
    ) -> APIResponse<commit_scan_session::APIResponse> {
        let body = commit_scan_session::RequestBody {
            session_id: input.session_id,
            selected_keys: input.selected_keys,
        };
        self.base
            .post(body, "scan/commit".into(), StatusCode::CREATED)
            .await
    }
}
