//! Driving ports for user account use-cases.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::identity::CallerIdentity;
use crate::domain::user::{UserId, UserSummary};

/// Client-supplied registration fields.
///
/// Role and office stay raw strings here; the service parses them against
/// the closed enumerations so unknown values surface as validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address; must be unique.
    pub email: String,
    /// Raw password; hashed before it reaches persistence.
    pub password: String,
    /// Requested role.
    pub role: String,
    /// Requested office.
    pub office: String,
}

/// Client-supplied password change fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordRequest {
    /// Password currently on the account.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

/// Domain use-case port for user account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a new account.
    async fn register(&self, request: RegisterRequest) -> Result<UserSummary, Error>;

    /// Change the caller's password after verifying the current one.
    async fn change_password(
        &self,
        caller: &CallerIdentity,
        request: ChangePasswordRequest,
    ) -> Result<(), Error>;

    /// Delete an account; admin only.
    async fn delete_user(&self, caller: &CallerIdentity, id: &UserId) -> Result<(), Error>;
}

/// Domain use-case port for user reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Resolve the caller identity behind a session subject.
    ///
    /// A missing account maps to an unauthorised error so stale sessions
    /// fail closed.
    async fn identity(&self, user_id: &UserId) -> Result<CallerIdentity, Error>;

    /// The caller's own profile.
    async fn profile(&self, user_id: &UserId) -> Result<UserSummary, Error>;

    /// All accounts; admin only.
    async fn list_users(&self, caller: &CallerIdentity) -> Result<Vec<UserSummary>, Error>;
}
