//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate credentials without
//! knowing the backing infrastructure, which keeps HTTP handler tests
//! deterministic: they substitute a test double instead of wiring
//! persistence and hashing.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::identity::LoginCredentials;
use crate::domain::user::UserId;

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
