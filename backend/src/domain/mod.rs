//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers, the ports at the hexagonal boundary, and the two
//! services (incidents, users) that implement the driving ports. Types are
//! kept immutable where practical; invariants and serialisation contracts
//! live in each type's Rustdoc.

pub mod attachment;
pub mod error;
pub mod identity;
pub mod incident;
mod incident_service;
pub mod ports;
pub mod user;
mod user_service;

pub use self::attachment::{
    ALLOWED_EXTENSIONS, Attachment, AttachmentKind, MAX_FILES_PER_REQUEST, MAX_UPLOAD_BYTES,
    UploadValidationError, UploadedFile,
};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{CallerIdentity, LoginCredentials, LoginValidationError};
pub use self::incident::{
    Incident, IncidentPatch, IncidentValidationError, NewIncident, Priority, Status,
};
pub use self::incident_service::IncidentService;
pub use self::user::{
    EmailAddress, Office, Role, User, UserId, UserSummary, UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
