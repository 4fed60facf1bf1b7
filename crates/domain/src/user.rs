use crate::shared::entity::{Entity, ID};

/// The owner of `Deadline`s and the recipient of their notifications.
///
/// Registration and credentials are handled elsewhere; this is the subset of
/// the account that the notification and scan pipelines read.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub username: String,
    /// Inactive users keep their data but receive no notifications and
    /// cannot use the api.
    pub is_active: bool,
}

impl User {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            email: email.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Name used when addressing the user in emails
    pub fn display_name(&self) -> &str {
        if self.username.trim().is_empty() {
            "there"
        } else {
            &self.username
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
