//! Driving ports for incident use-cases.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them
//! to run incident workflows without knowing (or importing) the backing
//! infrastructure. HTTP handler tests substitute mocks for these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::attachment::UploadedFile;
use crate::domain::identity::CallerIdentity;
use crate::domain::incident::{Incident, IncidentPatch};

/// Client-supplied fields of a new incident.
///
/// `priority` stays a raw string here; the service parses it so that an
/// unknown value surfaces as a validation error, not a deserialisation one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateIncidentRequest {
    /// Short summary of the problem.
    pub title: String,
    /// Full description of the problem.
    pub description: String,
    /// Requested priority, if any.
    pub priority: Option<String>,
}

/// Domain use-case port for incident mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentCommand: Send + Sync {
    /// File a new incident, uploading `files` to the attachment store first.
    async fn create(
        &self,
        caller: &CallerIdentity,
        request: CreateIncidentRequest,
        files: Vec<UploadedFile>,
    ) -> Result<Incident, Error>;

    /// Apply a partial field update.
    async fn update(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        patch: IncidentPatch,
    ) -> Result<Incident, Error>;

    /// Upload and append files to an existing incident.
    async fn add_files(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Incident, Error>;

    /// Delete one attachment, store-side first.
    async fn remove_file(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        public_id: &str,
    ) -> Result<Incident, Error>;

    /// Delete the incident and every attachment it references.
    async fn delete(&self, caller: &CallerIdentity, id: &Uuid) -> Result<(), Error>;
}

/// Domain use-case port for incident reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentQuery: Send + Sync {
    /// Incidents visible to the caller (all for admins, own office
    /// otherwise), in storage order.
    async fn list(&self, caller: &CallerIdentity) -> Result<Vec<Incident>, Error>;

    /// One incident, subject to office scoping.
    async fn get(&self, caller: &CallerIdentity, id: &Uuid) -> Result<Incident, Error>;
}
