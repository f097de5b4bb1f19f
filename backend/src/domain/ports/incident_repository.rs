//! Port abstraction for incident persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::attachment::Attachment;
use crate::domain::incident::{Incident, IncidentPatch, NewIncident};
use crate::domain::user::Office;

/// Persistence errors raised by incident repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IncidentPersistenceError {
    /// Repository connection could not be established.
    #[error("incident repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("incident repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl IncidentPersistenceError {
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

/// Port for incident persistence.
///
/// Mutating operations are single atomic statements on the adapter side:
/// `update_fields` patches and bumps the version in one statement, and the
/// attachment operations insert/delete child rows, so concurrent calls on
/// one incident cannot lose each other's updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Persist a new incident with its attachment descriptors.
    async fn create(&self, draft: &NewIncident) -> Result<Incident, IncidentPersistenceError>;

    /// Fetch an incident by identifier.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Incident>, IncidentPersistenceError>;

    /// All incidents in storage order.
    async fn list_all(&self) -> Result<Vec<Incident>, IncidentPersistenceError>;

    /// Incidents belonging to one office, in storage order.
    async fn list_by_office(
        &self,
        office: Office,
    ) -> Result<Vec<Incident>, IncidentPersistenceError>;

    /// Apply a partial field update; `None` when the id does not exist.
    async fn update_fields(
        &self,
        id: &Uuid,
        patch: &IncidentPatch,
    ) -> Result<Option<Incident>, IncidentPersistenceError>;

    /// Append attachment descriptors; `None` when the id does not exist.
    async fn append_attachments(
        &self,
        id: &Uuid,
        attachments: &[Attachment],
    ) -> Result<Option<Incident>, IncidentPersistenceError>;

    /// Remove one attachment descriptor by public id; `false` when no such
    /// descriptor was present.
    async fn remove_attachment(
        &self,
        id: &Uuid,
        public_id: &str,
    ) -> Result<bool, IncidentPersistenceError>;

    /// Delete the record; `false` when the id does not exist.
    async fn delete(&self, id: &Uuid) -> Result<bool, IncidentPersistenceError>;
}
