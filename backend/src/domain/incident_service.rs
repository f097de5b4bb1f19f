//! Incident domain service.
//!
//! Implements the incident driving ports over the repository and attachment
//! store ports. All role/office scoping, validation, and attachment
//! reconciliation lives here; handlers and adapters stay mechanical.
//!
//! Attachment ordering is the one non-obvious rule: a local `files` entry is
//! only removed after the store confirms the object is gone. The reverse
//! order would drop the reference needed to retry a failed remote deletion.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::attachment::{Attachment, UploadedFile};
use crate::domain::identity::CallerIdentity;
use crate::domain::incident::{
    Incident, IncidentPatch, IncidentValidationError, NewIncident, Priority,
};
use crate::domain::ports::{
    AttachmentStore, AttachmentStoreError, CreateIncidentRequest, IncidentCommand,
    IncidentPersistenceError, IncidentQuery, IncidentRepository,
};

/// Incident service implementing the command and query driving ports.
#[derive(Clone)]
pub struct IncidentService {
    incidents: Arc<dyn IncidentRepository>,
    store: Arc<dyn AttachmentStore>,
}

impl IncidentService {
    /// Create a service over the given persistence and store adapters.
    pub fn new(incidents: Arc<dyn IncidentRepository>, store: Arc<dyn AttachmentStore>) -> Self {
        Self { incidents, store }
    }

    /// Load an incident and enforce the caller's office scope.
    async fn load_scoped(&self, caller: &CallerIdentity, id: &Uuid) -> Result<Incident, Error> {
        let incident = self
            .incidents
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("Incident not found"))?;
        if !caller.may_access_office(incident.office) {
            return Err(Error::forbidden("incident belongs to another office"));
        }
        Ok(incident)
    }

    /// Upload every file, rolling back already-stored objects on failure so
    /// creation stays all-or-nothing.
    async fn upload_all(&self, files: &[UploadedFile]) -> Result<Vec<Attachment>, Error> {
        let mut uploaded: Vec<Attachment> = Vec::with_capacity(files.len());
        for file in files {
            match self.store.upload(file).await {
                Ok(attachment) => uploaded.push(attachment),
                Err(err) => {
                    self.rollback_uploads(&uploaded).await;
                    return Err(map_upload_error(&err, file.filename()));
                }
            }
        }
        Ok(uploaded)
    }

    /// Best-effort cleanup of objects uploaded before an aborted operation.
    /// Nothing references them yet, so a failure here only leaks storage.
    async fn rollback_uploads(&self, uploaded: &[Attachment]) {
        for attachment in uploaded {
            if let Err(err) = self
                .store
                .delete(&attachment.public_id, attachment.kind())
                .await
            {
                warn!(
                    public_id = %attachment.public_id,
                    error = %err,
                    "failed to clean up object after aborted upload batch"
                );
            }
        }
    }
}

fn map_persistence_error(error: IncidentPersistenceError) -> Error {
    match error {
        IncidentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("incident repository unavailable: {message}"))
        }
        IncidentPersistenceError::Query { message } => {
            Error::internal(format!("incident repository error: {message}"))
        }
    }
}

fn map_validation_error(error: IncidentValidationError) -> Error {
    match &error {
        IncidentValidationError::EmptyTitle => Error::field_validation("title", error.to_string()),
        IncidentValidationError::EmptyDescription => {
            Error::field_validation("description", error.to_string())
        }
        IncidentValidationError::PriorityNotValid => {
            Error::field_validation("priority", error.to_string())
        }
        IncidentValidationError::StatusNotValid
        | IncidentValidationError::InvalidTransition { .. } => {
            Error::field_validation("status", error.to_string())
        }
        IncidentValidationError::EmptyPatch => Error::invalid_request(error.to_string()),
    }
}

fn map_upload_error(error: &AttachmentStoreError, filename: &str) -> Error {
    warn!(file = filename, error = %error, "attachment upload failed");
    Error::store_failure("file upload failed").with_details(json!({ "file": filename }))
}

fn map_delete_error(error: &AttachmentStoreError, public_id: &str) -> Error {
    warn!(public_id, error = %error, "attachment deletion failed");
    Error::store_failure("attachment deletion failed")
        .with_details(json!({ "public_id": public_id }))
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, Error> {
    raw.map(|value| Priority::parse(value).map_err(map_validation_error))
        .transpose()
}

#[async_trait]
impl IncidentQuery for IncidentService {
    async fn list(&self, caller: &CallerIdentity) -> Result<Vec<Incident>, Error> {
        let incidents = if caller.role.is_admin() {
            self.incidents.list_all().await
        } else {
            self.incidents.list_by_office(caller.office).await
        };
        incidents.map_err(map_persistence_error)
    }

    async fn get(&self, caller: &CallerIdentity, id: &Uuid) -> Result<Incident, Error> {
        self.load_scoped(caller, id).await
    }
}

#[async_trait]
impl IncidentCommand for IncidentService {
    async fn create(
        &self,
        caller: &CallerIdentity,
        request: CreateIncidentRequest,
        files: Vec<UploadedFile>,
    ) -> Result<Incident, Error> {
        let priority = parse_priority(request.priority.as_deref())?;
        let draft = NewIncident::try_new(request.title, request.description, priority, caller)
            .map_err(map_validation_error)?;

        let attachments = self.upload_all(&files).await?;
        let incident = self
            .incidents
            .create(&draft.with_attachments(attachments))
            .await
            .map_err(map_persistence_error)?;
        debug!(incident_id = %incident.id, office = %incident.office, "incident created");
        Ok(incident)
    }

    async fn update(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        patch: IncidentPatch,
    ) -> Result<Incident, Error> {
        patch.validate().map_err(map_validation_error)?;
        let current = self.load_scoped(caller, id).await?;

        if let Some(status) = patch.status {
            if !caller.role.may_change_status() {
                return Err(Error::forbidden(
                    "you may not change the incident status",
                ));
            }
            if !current.status.may_transition_to(status) {
                return Err(map_validation_error(
                    IncidentValidationError::InvalidTransition {
                        from: current.status,
                        to: status,
                    },
                ));
            }
        }

        self.incidents
            .update_fields(id, &patch)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("Incident not found"))
    }

    async fn add_files(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<Incident, Error> {
        if files.is_empty() {
            return Err(Error::field_validation(
                "files",
                "at least one file is required",
            ));
        }
        self.load_scoped(caller, id).await?;

        let attachments = self.upload_all(&files).await?;
        self.incidents
            .append_attachments(id, &attachments)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("Incident not found"))
    }

    async fn remove_file(
        &self,
        caller: &CallerIdentity,
        id: &Uuid,
        public_id: &str,
    ) -> Result<Incident, Error> {
        if public_id.trim().is_empty() {
            return Err(Error::field_validation(
                "public_id",
                "public_id is required",
            ));
        }
        let incident = self.load_scoped(caller, id).await?;
        let attachment = incident
            .files
            .iter()
            .find(|attachment| attachment.public_id == public_id)
            .ok_or_else(|| Error::not_found("attachment not found"))?;

        // Remote deletion must confirm before the local reference goes away.
        self.store
            .delete(&attachment.public_id, attachment.kind())
            .await
            .map_err(|err| map_delete_error(&err, public_id))?;

        self.incidents
            .remove_attachment(id, public_id)
            .await
            .map_err(map_persistence_error)?;

        self.incidents
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("Incident not found"))
    }

    async fn delete(&self, caller: &CallerIdentity, id: &Uuid) -> Result<(), Error> {
        let incident = self.load_scoped(caller, id).await?;

        // Cascade store-side first. Each confirmed deletion is persisted
        // before moving on, so an abort keeps references only for objects
        // that still exist and the whole delete can be retried.
        for attachment in &incident.files {
            self.store
                .delete(&attachment.public_id, attachment.kind())
                .await
                .map_err(|err| map_delete_error(&err, &attachment.public_id))?;
            let removed = self
                .incidents
                .remove_attachment(id, &attachment.public_id)
                .await
                .map_err(map_persistence_error)?;
            if !removed {
                debug!(
                    incident_id = %id,
                    public_id = %attachment.public_id,
                    "attachment reference already removed"
                );
            }
        }

        let deleted = self
            .incidents
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        if !deleted {
            return Err(Error::not_found("Incident not found"));
        }
        debug!(incident_id = %id, "incident deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "incident_service_tests.rs"]
mod tests;
