//! Port abstraction for password hashing and verification.

use async_trait::async_trait;

/// Errors raised by password hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    /// Adapter-level failure description.
    pub message: String,
}

impl PasswordHashError {
    /// Build an error from an adapter failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Port for hashing passwords at rest and verifying login attempts.
///
/// Implementations are expected to run the (deliberately slow) key
/// derivation off the async executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password for storage.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a raw password against a stored hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
