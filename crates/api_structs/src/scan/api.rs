use crate::dtos::{CandidateDeadlineDTO, DeadlineDTO};
use chrono::{DateTime, Utc};
use deadliner_domain::{Deadline, ScanSession, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct ScanSessionResponse {
    pub session_id: ID,
    pub expires_at: DateTime<Utc>,
    pub candidates: Vec<CandidateDeadlineDTO>,
}

impl ScanSessionResponse {
    pub fn new(session: ScanSession) -> Self {
        Self {
            session_id: session.id,
            expires_at: session.expires_at,
            candidates: session
                .candidates
                .into_iter()
                .map(CandidateDeadlineDTO::new)
                .collect(),
        }
    }
}

pub mod scan_document {
    use super::*;

    pub type APIResponse = ScanSessionResponse;
}

pub mod get_scan_session {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub session_id: ID,
    }

    pub type APIResponse = ScanSessionResponse;
}

pub mod commit_scan_session {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct RequestBody {
        pub session_id: ID,
        #[serde(default)]
        pub selected_keys: Vec<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    pub struct APIResponse {
        pub status: String,
        pub count: usize,
        pub deadlines: Vec<DeadlineDTO>,
    }

    impl APIResponse {
        pub fn new(deadlines: Vec<Deadline>) -> Self {
            Self {
                status: "success".into(),
                count: deadlines.len(),
                deadlines: deadlines.into_iter().map(DeadlineDTO::new).collect(),
            }
        }
    }
}
