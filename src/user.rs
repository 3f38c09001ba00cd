//! The account performing the push.

use serde::{Deserialize, Serialize};

/// Kind of account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// A person.
    #[default]
    Normal,
    /// An automation or bot account.
    Service,
}

/// Authenticated account details for the push operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Login name, matched against `excludeUsers`.
    pub name: String,
    /// Display name, compared with committer names.
    pub display_name: String,
    /// Email address, compared with committer emails.
    pub email_address: String,
    /// Account type.
    pub user_type: UserType,
}

impl AuthenticatedUser {
    /// True for service and bot accounts.
    pub fn is_service_account(&self) -> bool {
        self.user_type == UserType::Service
    }
}

/// Source of the currently authenticated account.
pub trait UserProvider {
    /// Returns the account pushing the current ref changes.
    fn current_user(&self) -> AuthenticatedUser;
}

impl UserProvider for AuthenticatedUser {
    fn current_user(&self) -> AuthenticatedUser {
        self.clone()
    }
}
