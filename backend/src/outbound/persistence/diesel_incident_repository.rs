//! PostgreSQL-backed `IncidentRepository` implementation using Diesel.
//!
//! Attachment descriptors live in a child table; appends and removals are
//! row inserts/deletes, and field patches are single `UPDATE … RETURNING`
//! statements that bump the version counter, so concurrent calls on one
//! incident cannot lose each other's updates.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{IncidentPersistenceError, IncidentRepository};
use crate::domain::{
    Attachment, EmailAddress, Incident, IncidentPatch, NewIncident, Office, Priority, Status,
};

use super::models::{AttachmentRow, IncidentChangeset, IncidentRow, NewAttachmentRow, NewIncidentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{incident_attachments, incidents};

/// Diesel-backed implementation of the `IncidentRepository` port.
#[derive(Clone)]
pub struct DieselIncidentRepository {
    pool: DbPool,
}

impl DieselIncidentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IncidentPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            IncidentPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> IncidentPersistenceError {
    use diesel::result::Error as DieselError;

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            IncidentPersistenceError::connection("database connection error")
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            IncidentPersistenceError::query("database error")
        }
    }
}

/// Convert database rows to a domain incident; a value outside the closed
/// enumerations means the row was written by something else and is treated
/// as a query failure rather than silently coerced.
pub(super) fn rows_to_incident(
    row: &IncidentRow,
    attachment_rows: &[AttachmentRow],
) -> Result<Incident, IncidentPersistenceError> {
    let status = Status::parse(&row.status).map_err(|_| {
        IncidentPersistenceError::query(format!("stored status invalid: {}", row.status))
    })?;
    let priority = Priority::parse(&row.priority).map_err(|_| {
        IncidentPersistenceError::query(format!("stored priority invalid: {}", row.priority))
    })?;
    let office = Office::parse(&row.office).map_err(|_| {
        IncidentPersistenceError::query(format!("stored office invalid: {}", row.office))
    })?;
    let email = EmailAddress::new(&row.email).map_err(|_| {
        IncidentPersistenceError::query(format!("stored email invalid: {}", row.email))
    })?;
    let files = attachment_rows
        .iter()
        .map(|attachment| Attachment {
            url: attachment.url.clone(),
            public_id: attachment.public_id.clone(),
        })
        .collect();
    Ok(Incident {
        id: row.id,
        title: row.title.clone(),
        description: row.description.clone(),
        status,
        priority,
        office,
        name: row.name.clone(),
        email,
        files,
        created_at: row.created_at,
        version: row.version,
    })
}

#[async_trait]
impl IncidentRepository for DieselIncidentRepository {
    async fn create(&self, draft: &NewIncident) -> Result<Incident, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let incident_id = Uuid::new_v4();
        let row = NewIncidentRow {
            id: incident_id,
            title: &draft.title,
            description: &draft.description,
            status: Status::default().as_str(),
            priority: draft.priority.as_str(),
            office: draft.office.as_str(),
            name: &draft.name,
            email: draft.email.as_ref(),
        };
        let attachments = &draft.attachments;

        let (incident_row, attachment_rows) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let incident_row: IncidentRow = diesel::insert_into(incidents::table)
                        .values(&row)
                        .returning(IncidentRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let new_rows: Vec<NewAttachmentRow<'_>> = attachments
                        .iter()
                        .enumerate()
                        .map(|(index, attachment)| NewAttachmentRow {
                            id: Uuid::new_v4(),
                            incident_id,
                            url: &attachment.url,
                            public_id: &attachment.public_id,
                            position: i32::try_from(index).unwrap_or(i32::MAX),
                        })
                        .collect();
                    if !new_rows.is_empty() {
                        diesel::insert_into(incident_attachments::table)
                            .values(&new_rows)
                            .execute(conn)
                            .await?;
                    }

                    let attachment_rows = incident_attachments::table
                        .filter(incident_attachments::incident_id.eq(incident_id))
                        .order(incident_attachments::position.asc())
                        .select(AttachmentRow::as_select())
                        .load(conn)
                        .await?;
                    Ok((incident_row, attachment_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        rows_to_incident(&incident_row, &attachment_rows)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Incident>, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = incidents::table
            .filter(incidents::id.eq(id))
            .select(IncidentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let attachment_rows = incident_attachments::table
            .filter(incident_attachments::incident_id.eq(id))
            .order(incident_attachments::position.asc())
            .select(AttachmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_incident(&row, &attachment_rows).map(Some)
    }

    async fn list_all(&self) -> Result<Vec<Incident>, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = incidents::table
            .order(incidents::created_at.asc())
            .select(IncidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_with_attachments(&mut conn, rows).await
    }

    async fn list_by_office(
        &self,
        office: Office,
    ) -> Result<Vec<Incident>, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = incidents::table
            .filter(incidents::office.eq(office.as_str()))
            .order(incidents::created_at.asc())
            .select(IncidentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_with_attachments(&mut conn, rows).await
    }

    async fn update_fields(
        &self,
        id: &Uuid,
        patch: &IncidentPatch,
    ) -> Result<Option<Incident>, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = IncidentChangeset {
            title: patch.title.as_deref(),
            description: patch.description.as_deref(),
            status: patch.status.map(Status::as_str),
            priority: patch.priority.map(Priority::as_str),
        };
        let row = diesel::update(incidents::table.filter(incidents::id.eq(id)))
            .set((
                &changeset,
                incidents::version.eq(incidents::version + 1),
                incidents::updated_at.eq(diesel::dsl::now),
            ))
            .returning(IncidentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let attachment_rows = incident_attachments::table
            .filter(incident_attachments::incident_id.eq(id))
            .order(incident_attachments::position.asc())
            .select(AttachmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_incident(&row, &attachment_rows).map(Some)
    }

    async fn append_attachments(
        &self,
        id: &Uuid,
        attachments: &[Attachment],
    ) -> Result<Option<Incident>, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let incident_id = *id;

        let loaded = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let exists: Option<Uuid> = incidents::table
                        .filter(incidents::id.eq(incident_id))
                        .select(incidents::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if exists.is_none() {
                        return Ok(None);
                    }

                    let base: Option<i32> = incident_attachments::table
                        .filter(incident_attachments::incident_id.eq(incident_id))
                        .select(diesel::dsl::max(incident_attachments::position))
                        .first(conn)
                        .await?;
                    let base = base.map_or(0, |position| position + 1);

                    let new_rows: Vec<NewAttachmentRow<'_>> = attachments
                        .iter()
                        .enumerate()
                        .map(|(index, attachment)| NewAttachmentRow {
                            id: Uuid::new_v4(),
                            incident_id,
                            url: &attachment.url,
                            public_id: &attachment.public_id,
                            position: base
                                .saturating_add(i32::try_from(index).unwrap_or(i32::MAX)),
                        })
                        .collect();
                    if !new_rows.is_empty() {
                        diesel::insert_into(incident_attachments::table)
                            .values(&new_rows)
                            .execute(conn)
                            .await?;
                    }

                    let row: IncidentRow = incidents::table
                        .filter(incidents::id.eq(incident_id))
                        .select(IncidentRow::as_select())
                        .first(conn)
                        .await?;
                    let attachment_rows = incident_attachments::table
                        .filter(incident_attachments::incident_id.eq(incident_id))
                        .order(incident_attachments::position.asc())
                        .select(AttachmentRow::as_select())
                        .load(conn)
                        .await?;
                    Ok(Some((row, attachment_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        loaded
            .map(|(row, attachment_rows)| rows_to_incident(&row, &attachment_rows))
            .transpose()
    }

    async fn remove_attachment(
        &self,
        id: &Uuid,
        public_id: &str,
    ) -> Result<bool, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            incident_attachments::table
                .filter(incident_attachments::incident_id.eq(id))
                .filter(incident_attachments::public_id.eq(public_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, IncidentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(incidents::table.filter(incidents::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

async fn collect_with_attachments(
    conn: &mut diesel_async::pooled_connection::bb8::PooledConnection<
        '_,
        diesel_async::AsyncPgConnection,
    >,
    rows: Vec<IncidentRow>,
) -> Result<Vec<Incident>, IncidentPersistenceError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let attachment_rows: Vec<AttachmentRow> = incident_attachments::table
        .filter(incident_attachments::incident_id.eq_any(&ids))
        .order((
            incident_attachments::incident_id.asc(),
            incident_attachments::position.asc(),
        ))
        .select(AttachmentRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<Uuid, Vec<AttachmentRow>> = HashMap::new();
    for attachment in attachment_rows {
        grouped
            .entry(attachment.incident_id)
            .or_default()
            .push(attachment);
    }

    rows.iter()
        .map(|row| {
            let attachments = grouped.remove(&row.id).unwrap_or_default();
            rows_to_incident(row, &attachments)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Row mapping coverage; query execution is exercised against a real
    //! database in deployment, not here.
    use super::*;
    use chrono::Utc;

    fn sample_row() -> IncidentRow {
        IncidentRow {
            id: Uuid::new_v4(),
            title: "Printer down".to_owned(),
            description: "No toner".to_owned(),
            status: "En Progreso".to_owned(),
            priority: "Alta".to_owned(),
            office: "Fuengirola".to_owned(),
            name: "Ana".to_owned(),
            email: "ana@x.example".to_owned(),
            version: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_attachment_row(incident_id: Uuid, public_id: &str, position: i32) -> AttachmentRow {
        AttachmentRow {
            id: Uuid::new_v4(),
            incident_id,
            url: format!("https://files.example/{public_id}"),
            public_id: public_id.to_owned(),
            position,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rows_map_to_domain_incident() {
        let row = sample_row();
        let attachments = vec![
            sample_attachment_row(row.id, "a.pdf", 0),
            sample_attachment_row(row.id, "b.jpg", 1),
        ];
        let incident = rows_to_incident(&row, &attachments).expect("valid rows");
        assert_eq!(incident.status, Status::EnProgreso);
        assert_eq!(incident.priority, Priority::Alta);
        assert_eq!(incident.office, Office::Fuengirola);
        assert_eq!(incident.version, 3);
        assert_eq!(incident.files.len(), 2);
        assert_eq!(incident.files[0].public_id, "a.pdf");
    }

    #[test]
    fn unknown_stored_status_is_a_query_error() {
        let mut row = sample_row();
        row.status = "Archivado".to_owned();
        let err = rows_to_incident(&row, &[]).expect_err("invalid status");
        assert!(matches!(err, IncidentPersistenceError::Query { .. }));
    }

    #[test]
    fn unknown_stored_priority_is_a_query_error() {
        let mut row = sample_row();
        row.priority = "Critical".to_owned();
        let err = rows_to_incident(&row, &[]).expect_err("invalid priority");
        assert!(matches!(err, IncidentPersistenceError::Query { .. }));
    }
}
