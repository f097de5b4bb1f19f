//! Argon2id password hasher implementing the password-hasher port.
//!
//! Key derivation is deliberately slow, so both operations run on the
//! blocking thread pool rather than the async executor.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| PasswordHashError::new(err.to_string()))
        })
        .await
        .map_err(|err| PasswordHashError::new(format!("hashing task failed: {err}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|err| PasswordHashError::new(format!("stored hash invalid: {err}")))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|err| PasswordHashError::new(format!("verification task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_round_trips() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse").await.expect("hashing works");
        assert_ne!(hash, "correct horse");
        assert!(
            hasher
                .verify("correct horse", &hash)
                .await
                .expect("verification works")
        );
    }

    #[tokio::test]
    async fn wrong_password_fails_verification() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse").await.expect("hashing works");
        assert!(
            !hasher
                .verify("battery staple", &hash)
                .await
                .expect("verification works")
        );
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_error() {
        let hasher = Argon2PasswordHasher;
        let err = hasher
            .verify("anything", "not-a-phc-string")
            .await
            .expect_err("malformed hash");
        assert!(err.message.contains("stored hash invalid"));
    }
}
