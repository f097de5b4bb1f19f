//! User account domain service.
//!
//! Implements registration, authentication, password change, and the admin
//! account views over the user repository and password hasher ports.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::Error;
use crate::domain::identity::{CallerIdentity, LoginCredentials};
use crate::domain::ports::{
    ChangePasswordRequest, LoginService, PasswordHashError, PasswordHasher, RegisterRequest,
    UserCommand, UserPersistenceError, UserQuery, UserRepository,
};
use crate::domain::user::{
    EmailAddress, Office, Role, User, UserId, UserSummary, UserValidationError,
};

/// User service implementing the account driving ports.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a service over the given persistence and hashing adapters.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    async fn load_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::conflict("email already registered"),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_validation_error(error: UserValidationError) -> Error {
    let field = match error {
        UserValidationError::InvalidId => "id",
        UserValidationError::EmptyName => "name",
        UserValidationError::InvalidEmail => "email",
        UserValidationError::RoleNotValid => "role",
        UserValidationError::OfficeNotValid => "office",
        UserValidationError::EmptyPassword => "password",
    };
    Error::field_validation(field, error.to_string())
}

#[async_trait]
impl UserCommand for UserService {
    async fn register(&self, request: RegisterRequest) -> Result<UserSummary, Error> {
        let role = Role::parse(&request.role).map_err(map_validation_error)?;
        let office = Office::parse(&request.office).map_err(map_validation_error)?;
        let email = EmailAddress::new(&request.email).map_err(map_validation_error)?;
        if request.password.is_empty() {
            return Err(map_validation_error(UserValidationError::EmptyPassword));
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .await
            .map_err(map_hash_error)?;
        let user = User::new(
            UserId::random(),
            request.name,
            email,
            password_hash,
            role,
            office,
        )
        .map_err(map_validation_error)?;

        self.users
            .insert(&user)
            .await
            .map_err(map_persistence_error)?;
        debug!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(UserSummary::from(&user))
    }

    async fn change_password(
        &self,
        caller: &CallerIdentity,
        request: ChangePasswordRequest,
    ) -> Result<(), Error> {
        if request.new_password.is_empty() {
            return Err(Error::field_validation(
                "new_password",
                "password must not be empty",
            ));
        }

        let user = self
            .load_by_id(&caller.user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let current_ok = self
            .hasher
            .verify(&request.current_password, user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !current_ok {
            return Err(Error::field_validation(
                "current_password",
                "incorrect current password",
            ));
        }

        let new_hash = self
            .hasher
            .hash(&request.new_password)
            .await
            .map_err(map_hash_error)?;
        let updated = self
            .users
            .update_password_hash(&caller.user_id, &new_hash)
            .await
            .map_err(map_persistence_error)?;
        if !updated {
            return Err(Error::not_found("user not found"));
        }
        Ok(())
    }

    async fn delete_user(&self, caller: &CallerIdentity, id: &UserId) -> Result<(), Error> {
        if !caller.role.is_admin() {
            return Err(Error::forbidden("administrator access required"));
        }
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        if !deleted {
            return Err(Error::not_found("user not found"));
        }
        debug!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl UserQuery for UserService {
    async fn identity(&self, user_id: &UserId) -> Result<CallerIdentity, Error> {
        let user = self
            .load_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        Ok(CallerIdentity::from(&user))
    }

    async fn profile(&self, user_id: &UserId) -> Result<UserSummary, Error> {
        let user = self
            .load_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(UserSummary::from(&user))
    }

    async fn list_users(&self, caller: &CallerIdentity) -> Result<Vec<UserSummary>, Error> {
        if !caller.role.is_admin() {
            return Err(Error::forbidden("administrator access required"));
        }
        let users = self.users.list_all().await.map_err(map_persistence_error)?;
        Ok(users.iter().map(UserSummary::from).collect())
    }
}

#[async_trait]
impl LoginService for UserService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        let password_ok = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hash_error)?;
        if !password_ok {
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(user.id())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
