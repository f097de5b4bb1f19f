//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// Insert violated the unique email constraint.
    #[error("email already registered")]
    DuplicateEmail,
}

impl UserPersistenceError {
    /// Connection-level failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-level failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for user account persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with [`UserPersistenceError::DuplicateEmail`]
    /// when the email is already taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// All users in storage order.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Replace a user's password hash; `false` when the id does not exist.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError>;

    /// Delete a user; `false` when the id does not exist.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
