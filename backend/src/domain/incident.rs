//! Incident (support ticket) data model.
//!
//! Status changes are validated against an explicit transition table; the
//! storage-order `files` list holds descriptors whose objects live in the
//! external attachment store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::attachment::Attachment;
use super::identity::CallerIdentity;
use super::user::{EmailAddress, Office};

/// Validation errors raised by incident constructors and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentValidationError {
    /// Title was missing or blank once trimmed.
    EmptyTitle,
    /// Description was missing or blank once trimmed.
    EmptyDescription,
    /// Priority value outside the closed enumeration.
    PriorityNotValid,
    /// Status value outside the closed enumeration.
    StatusNotValid,
    /// The requested status change is not a legal transition.
    InvalidTransition {
        /// Status the incident currently holds.
        from: Status,
        /// Status the patch asked for.
        to: Status,
    },
    /// The patch contained no fields at all.
    EmptyPatch,
}

impl fmt::Display for IncidentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::EmptyDescription => write!(f, "description is required"),
            Self::PriorityNotValid => write!(f, "priority not valid"),
            Self::StatusNotValid => write!(f, "status not valid"),
            Self::InvalidTransition { from, to } => {
                write!(f, "status cannot change from {from} to {to}")
            }
            Self::EmptyPatch => write!(f, "nothing to update"),
        }
    }
}

impl std::error::Error for IncidentValidationError {}

/// Triage priority of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    /// Urgent.
    Alta,
    /// Default for new incidents.
    #[default]
    Media,
    /// Low.
    Baja,
}

impl Priority {
    /// Parse a wire value into the closed enumeration.
    pub fn parse(value: &str) -> Result<Self, IncidentValidationError> {
        match value {
            "Alta" => Ok(Self::Alta),
            "Media" => Ok(Self::Media),
            "Baja" => Ok(Self::Baja),
            _ => Err(IncidentValidationError::PriorityNotValid),
        }
    }

    /// Wire representation of the priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alta => "Alta",
            Self::Media => "Media",
            Self::Baja => "Baja",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Status {
    /// Newly filed, awaiting triage.
    #[default]
    Pendiente,
    /// Being worked by a technician.
    #[serde(rename = "En Progreso")]
    EnProgreso,
    /// Closed as resolved.
    Resuelto,
}

impl Status {
    /// Parse a wire value into the closed enumeration.
    pub fn parse(value: &str) -> Result<Self, IncidentValidationError> {
        match value {
            "Pendiente" => Ok(Self::Pendiente),
            "En Progreso" => Ok(Self::EnProgreso),
            "Resuelto" => Ok(Self::Resuelto),
            _ => Err(IncidentValidationError::StatusNotValid),
        }
    }

    /// Wire representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::EnProgreso => "En Progreso",
            Self::Resuelto => "Resuelto",
        }
    }

    /// Whether a change from `self` to `to` is a legal transition.
    ///
    /// The lifecycle only moves forward: `Pendiente → En Progreso →
    /// Resuelto`, with the direct `Pendiente → Resuelto` shortcut for
    /// trivially-closed tickets. Same-state patches are no-ops and allowed.
    pub fn may_transition_to(self, to: Self) -> bool {
        match (self, to) {
            (from, to) if from == to => true,
            (Self::Pendiente, Self::EnProgreso | Self::Resuelto) => true,
            (Self::EnProgreso, Self::Resuelto) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A support ticket.
///
/// ## Invariants
/// - `title` and `description` are non-empty once trimmed.
/// - `office`, `name`, and `email` come from the creator's identity.
/// - Every element of `files` refers to an object in the attachment store;
///   services only persist a removal after the store confirms deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Stable incident identifier.
    #[schema(value_type = String, example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    pub id: Uuid,
    /// Short summary of the problem.
    pub title: String,
    /// Full description of the problem.
    pub description: String,
    /// Lifecycle status.
    pub status: Status,
    /// Triage priority.
    pub priority: Priority,
    /// Office the incident belongs to (the creator's office).
    pub office: Office,
    /// Creator's display name.
    pub name: String,
    /// Creator's contact email.
    #[schema(value_type = String, example = "ana@example.com")]
    pub email: EmailAddress,
    /// Attachment descriptors in upload order.
    pub files: Vec<Attachment>,
    /// Creation timestamp, immutable.
    #[schema(value_type = String, example = "2026-03-02T10:15:30Z")]
    pub created_at: DateTime<Utc>,
    /// Update counter bumped by field patches; internal only.
    #[serde(skip)]
    pub version: i64,
}

/// Validated draft of a new incident, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    /// Short summary of the problem.
    pub title: String,
    /// Full description of the problem.
    pub description: String,
    /// Triage priority; defaults to [`Priority::Media`] when omitted.
    pub priority: Priority,
    /// Office copied from the creator.
    pub office: Office,
    /// Creator's display name.
    pub name: String,
    /// Creator's contact email.
    pub email: EmailAddress,
    /// Descriptors of files already uploaded to the store.
    pub attachments: Vec<Attachment>,
}

impl NewIncident {
    /// Validate a draft; identity fields come from the caller, never from
    /// client input.
    pub fn try_new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Option<Priority>,
        caller: &CallerIdentity,
    ) -> Result<Self, IncidentValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(IncidentValidationError::EmptyTitle);
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(IncidentValidationError::EmptyDescription);
        }
        Ok(Self {
            title,
            description,
            priority: priority.unwrap_or_default(),
            office: caller.office,
            name: caller.name.clone(),
            email: caller.email.clone(),
            attachments: Vec::new(),
        })
    }

    /// Attach descriptors for files already uploaded to the store.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Partial update of incident fields; absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IncidentPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Requested status; subject to role and transition checks.
    pub status: Option<Status>,
    /// Replacement priority.
    pub priority: Option<Priority>,
}

impl IncidentPatch {
    /// Whether the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }

    /// Validate field contents (presence of fields is the caller's concern).
    pub fn validate(&self) -> Result<(), IncidentValidationError> {
        if self.is_empty() {
            return Err(IncidentValidationError::EmptyPatch);
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(IncidentValidationError::EmptyTitle);
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(IncidentValidationError::EmptyDescription);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::user::{Role, UserId};
    use rstest::rstest;

    fn caller(office: Office) -> CallerIdentity {
        CallerIdentity {
            user_id: UserId::random(),
            name: "Ana".to_owned(),
            email: EmailAddress::new("ana@x.example").expect("valid email"),
            role: Role::User,
            office,
        }
    }

    #[rstest]
    #[case(Status::Pendiente, Status::Pendiente, true)]
    #[case(Status::Pendiente, Status::EnProgreso, true)]
    #[case(Status::Pendiente, Status::Resuelto, true)]
    #[case(Status::EnProgreso, Status::EnProgreso, true)]
    #[case(Status::EnProgreso, Status::Resuelto, true)]
    #[case(Status::EnProgreso, Status::Pendiente, false)]
    #[case(Status::Resuelto, Status::Resuelto, true)]
    #[case(Status::Resuelto, Status::Pendiente, false)]
    #[case(Status::Resuelto, Status::EnProgreso, false)]
    fn transition_table(#[case] from: Status, #[case] to: Status, #[case] allowed: bool) {
        assert_eq!(from.may_transition_to(to), allowed);
    }

    #[test]
    fn status_serialises_with_space() {
        let value = serde_json::to_value(Status::EnProgreso).expect("serialise status");
        assert_eq!(value, serde_json::json!("En Progreso"));
        let back: Status = serde_json::from_value(value).expect("deserialise status");
        assert_eq!(back, Status::EnProgreso);
    }

    #[test]
    fn priority_defaults_to_media() {
        assert_eq!(Priority::default(), Priority::Media);
    }

    #[rstest]
    #[case("", "desc", IncidentValidationError::EmptyTitle)]
    #[case("   ", "desc", IncidentValidationError::EmptyTitle)]
    #[case("title", "", IncidentValidationError::EmptyDescription)]
    #[case("title", "  \t ", IncidentValidationError::EmptyDescription)]
    fn draft_requires_title_and_description(
        #[case] title: &str,
        #[case] description: &str,
        #[case] expected: IncidentValidationError,
    ) {
        let err = NewIncident::try_new(title, description, None, &caller(Office::Malaga))
            .expect_err("invalid draft");
        assert_eq!(err, expected);
    }

    #[test]
    fn draft_copies_identity_fields_from_caller() {
        let by = caller(Office::ElPalo);
        let draft = NewIncident::try_new("Printer down", "No toner", None, &by)
            .expect("valid draft");
        assert_eq!(draft.office, Office::ElPalo);
        assert_eq!(draft.name, "Ana");
        assert_eq!(draft.email.as_ref(), "ana@x.example");
        assert_eq!(draft.priority, Priority::Media);
        assert!(draft.attachments.is_empty());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = IncidentPatch::default().validate().expect_err("empty patch");
        assert_eq!(err, IncidentValidationError::EmptyPatch);
    }

    #[test]
    fn patch_rejects_blank_replacement_title() {
        let patch = IncidentPatch {
            title: Some("  ".to_owned()),
            ..IncidentPatch::default()
        };
        let err = patch.validate().expect_err("blank title");
        assert_eq!(err, IncidentValidationError::EmptyTitle);
    }

    #[test]
    fn patch_with_only_priority_is_valid() {
        let patch = IncidentPatch {
            priority: Some(Priority::Alta),
            ..IncidentPatch::default()
        };
        assert!(patch.validate().is_ok());
    }
}
