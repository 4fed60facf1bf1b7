mod base;
mod notification;
mod scan;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
pub use deadliner_api_structs::dtos::*;
pub use deadliner_domain::{Priority, ID};
use notification::NotificationClient;
pub use reqwest::StatusCode;
use scan::ScanClient;
pub use scan::{CommitScanSessionInput, ScanDocumentInput};
use status::StatusClient;
use std::sync::Arc;

/// Deadliner Server SDK
///
/// Admin clients are created with `new`, clients acting on behalf of a
/// single user with `for_user`.
#[derive(Clone)]
pub struct DeadlinerSDK {
    pub notification: NotificationClient,
    pub scan: ScanClient,
    pub status: StatusClient,
}

impl DeadlinerSDK {
    pub fn new<T: Into<String>>(address: String, api_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key.into());
        Self::from_base(base)
    }

    pub fn for_user<T: Into<String>>(address: String, token: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_user_token(token.into());
        Self::from_base(base)
    }

    fn from_base(base: BaseClient) -> Self {
        let base = Arc::new(base);
        Self {
            notification: NotificationClient::new(base.clone()),
            scan: ScanClient::new(base.clone()),
            status: StatusClient::new(base),
        }
    }
}
