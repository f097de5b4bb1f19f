//! User account data model.
//!
//! Roles and offices are closed enumerations; ad hoc string comparisons are
//! kept out of services by parsing inbound values here once.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was not a valid UUID.
    InvalidId,
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Email did not look like an address.
    InvalidEmail,
    /// Role value outside the closed enumeration.
    RoleNotValid,
    /// Office value outside the closed enumeration.
    OfficeNotValid,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::RoleNotValid => write!(f, "role not valid"),
            Self::OfficeNotValid => write!(f, "office not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role governing field-level write permissions and visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular requester; sees their office, may not change incident status.
    User,
    /// Full visibility and account management.
    Admin,
    /// Technician; office-scoped but may triage (change status/priority).
    Tecnico,
}

impl Role {
    /// Parse a wire value into the closed enumeration.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "tecnico" => Ok(Self::Tecnico),
            _ => Err(UserValidationError::RoleNotValid),
        }
    }

    /// Wire representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Tecnico => "tecnico",
        }
    }

    /// Whether the role sees and manages every office.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may change an incident's status.
    pub fn may_change_status(self) -> bool {
        !matches!(self, Self::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organisational location scoping incident visibility for non-admin users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Office {
    /// Central office.
    #[serde(rename = "Malaga")]
    Malaga,
    /// El Palo branch.
    #[serde(rename = "El Palo")]
    ElPalo,
    /// Fuengirola branch.
    #[serde(rename = "Fuengirola")]
    Fuengirola,
}

impl Office {
    /// Parse a wire value into the closed enumeration.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "Malaga" => Ok(Self::Malaga),
            "El Palo" => Ok(Self::ElPalo),
            "Fuengirola" => Ok(Self::Fuengirola),
            _ => Err(UserValidationError::OfficeNotValid),
        }
    }

    /// Wire representation of the office.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Malaga => "Malaga",
            Self::ElPalo => "El Palo",
            Self::Fuengirola => "Fuengirola",
        }
    }
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, normalised email address.
///
/// ## Invariants
/// - Trimmed, lowercased, non-empty local part and domain around one `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = value.as_ref().trim().to_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user account.
///
/// Carries the password hash, so the aggregate itself never serialises;
/// [`UserSummary`] is the wire-facing projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    password_hash: String,
    role: Role,
    office: Office,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: EmailAddress,
        password_hash: impl Into<String>,
        role: Role,
        office: Office,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            email,
            password_hash: password_hash.into(),
            role,
            office,
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password hash at rest.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Account role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Account office.
    pub fn office(&self) -> Office {
        self.office
    }
}

/// Wire-facing projection of a user, without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    /// Stable user identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    #[schema(value_type = String, example = "ana@example.com")]
    pub email: EmailAddress,
    /// Account role.
    pub role: Role,
    /// Account office.
    pub office: Office,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
            email: user.email().clone(),
            role: user.role(),
            office: user.office(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user", Role::User)]
    #[case("admin", Role::Admin)]
    #[case("tecnico", Role::Tecnico)]
    fn role_parse_round_trips(#[case] raw: &str, #[case] expected: Role) {
        let role = Role::parse(raw).expect("known role");
        assert_eq!(role, expected);
        assert_eq!(role.as_str(), raw);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = Role::parse("ghost").expect_err("unknown role");
        assert_eq!(err, UserValidationError::RoleNotValid);
        assert_eq!(err.to_string(), "role not valid");
    }

    #[rstest]
    #[case("Malaga", Office::Malaga)]
    #[case("El Palo", Office::ElPalo)]
    #[case("Fuengirola", Office::Fuengirola)]
    fn office_parse_round_trips(#[case] raw: &str, #[case] expected: Office) {
        let office = Office::parse(raw).expect("known office");
        assert_eq!(office, expected);
        assert_eq!(office.as_str(), raw);
    }

    #[test]
    fn office_serialises_with_spaces_preserved() {
        let value = serde_json::to_value(Office::ElPalo).expect("serialise office");
        assert_eq!(value, serde_json::json!("El Palo"));
    }

    #[rstest]
    #[case("  Ana@Example.COM  ", "ana@example.com")]
    #[case("tech@helpdesk.example", "tech@helpdesk.example")]
    fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@missing-local.example")]
    #[case("missing-domain@")]
    #[case("no-dot@domain")]
    fn malformed_emails_are_rejected(#[case] raw: &str) {
        let err = EmailAddress::new(raw).expect_err("invalid email");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }

    #[test]
    fn blank_name_is_rejected() {
        let email = EmailAddress::new("a@x.example").expect("valid email");
        let err = User::new(UserId::random(), "   ", email, "hash", Role::User, Office::Malaga)
            .expect_err("blank name");
        assert_eq!(err, UserValidationError::EmptyName);
    }

    #[test]
    fn role_capabilities_follow_the_matrix() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Tecnico.is_admin());
        assert!(Role::Tecnico.may_change_status());
        assert!(Role::Admin.may_change_status());
        assert!(!Role::User.may_change_status());
    }
}
