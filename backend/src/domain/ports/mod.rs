//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, attachment store, password hasher) are
//! implemented by outbound adapters; driving ports (commands, queries,
//! login) are implemented by the domain services and called by inbound
//! adapters. Every port gets a `mockall` mock under `cfg(test)`.

mod attachment_store;
mod incident_ops;
mod incident_repository;
mod login_service;
mod password_hasher;
mod user_ops;
mod user_repository;

#[cfg(test)]
pub use attachment_store::MockAttachmentStore;
pub use attachment_store::{AttachmentStore, AttachmentStoreError};
#[cfg(test)]
pub use incident_ops::{MockIncidentCommand, MockIncidentQuery};
pub use incident_ops::{CreateIncidentRequest, IncidentCommand, IncidentQuery};
#[cfg(test)]
pub use incident_repository::MockIncidentRepository;
pub use incident_repository::{IncidentPersistenceError, IncidentRepository};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_ops::{MockUserCommand, MockUserQuery};
pub use user_ops::{ChangePasswordRequest, RegisterRequest, UserCommand, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
