//! Authentication primitives: login credentials and the resolved caller.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, Office, Role, User, UserId};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `email` is normalised (trimmed, lowercased).
/// - `password` is non-empty but otherwise untouched to avoid surprising
///   credential comparisons; the buffer zeroises on drop.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity of the caller resolved from the session subject.
///
/// Services trust these fields over anything in the request body: office and
/// contact details on a new incident always come from here, never from
/// client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Display name copied onto created incidents.
    pub name: String,
    /// Contact email copied onto created incidents.
    pub email: EmailAddress,
    /// Role governing visibility and field-level write permissions.
    pub role: Role,
    /// Office scoping visibility for non-admin roles.
    pub office: Office,
}

impl CallerIdentity {
    /// Whether this caller may see and mutate the given office's incidents.
    pub fn may_access_office(&self, office: Office) -> bool {
        self.role.is_admin() || self.office == office
    }
}

impl From<&User> for CallerIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            name: user.name().to_owned(),
            email: user.email().clone(),
            role: user.role(),
            office: user.office(),
        }
    }
}
