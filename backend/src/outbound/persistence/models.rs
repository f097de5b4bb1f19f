//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{incident_attachments, incidents, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub office: String,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub office: &'a str,
}

/// Row struct for reading from the incidents table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incidents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IncidentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub office: String,
    pub name: String,
    pub email: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new incident records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = incidents)]
pub(crate) struct NewIncidentRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub office: &'a str,
    pub name: &'a str,
    pub email: &'a str,
}

/// Changeset applying only the fields present in a patch; `None` fields are
/// skipped by Diesel, which is exactly the partial-update contract.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = incidents)]
pub(crate) struct IncidentChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
}

/// Row struct for reading attachment descriptors.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = incident_attachments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttachmentRow {
    #[expect(dead_code, reason = "surrogate key; the domain keys by public_id")]
    pub id: Uuid,
    pub incident_id: Uuid,
    pub url: String,
    pub public_id: String,
    #[expect(dead_code, reason = "used only in ORDER BY clauses")]
    pub position: i32,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for attachment descriptors.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = incident_attachments)]
pub(crate) struct NewAttachmentRow<'a> {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub url: &'a str,
    pub public_id: &'a str,
    pub position: i32,
}
