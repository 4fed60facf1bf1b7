use crate::shared::usecase::UseCase;
use deadliner_infra::DeadlinerContext;
use tracing::info;

/// Deletes every `ScanSession` that expired before now
#[derive(Debug)]
pub struct SweepScanSessionsUseCase;

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(String),
}

#[async_trait::async_trait(?Send)]
impl UseCase for SweepScanSessionsUseCase {
    type Response = u64;

    type Error = UseCaseError;

    const NAME: &'static str = "SweepScanSessions";

    async fn execute(&mut self, ctx: &DeadlinerContext) -> Result<Self::Response, Self::Error> {
        let deleted = ctx
            .repos
            .scan_sessions
            .delete_expired(ctx.sys.now())
            .await
            .map_err(|e| UseCaseError::StorageError(e.to_string()))?;

        if deleted > 0 {
            info!(deleted, "Expired scan sessions removed");
        }
        Ok(deleted)
    }
}
