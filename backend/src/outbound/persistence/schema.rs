//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the SQL migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! When migrations change the schema, update this file to match (or
//! regenerate it with `diesel print-schema` against a migrated database).

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Normalised email address; unique.
        email -> Varchar,
        /// Argon2id password hash.
        password_hash -> Varchar,
        /// Role: `user`, `admin`, or `tecnico`.
        role -> Varchar,
        /// Office the account belongs to.
        office -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Incident (support ticket) records.
    incidents (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Short summary.
        title -> Varchar,
        /// Full description.
        description -> Text,
        /// Lifecycle status: `Pendiente`, `En Progreso`, or `Resuelto`.
        status -> Varchar,
        /// Triage priority: `Alta`, `Media`, or `Baja`.
        priority -> Varchar,
        /// Office the incident belongs to.
        office -> Varchar,
        /// Creator's display name, copied at creation.
        name -> Varchar,
        /// Creator's contact email, copied at creation.
        email -> Varchar,
        /// Update counter bumped by field patches.
        version -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attachment descriptors, one row per stored object.
    ///
    /// Kept in a child table so concurrent appends and removals are row
    /// inserts/deletes rather than read-modify-write cycles on a list.
    incident_attachments (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Owning incident.
        incident_id -> Uuid,
        /// Public URL serving the object.
        url -> Varchar,
        /// Opaque identifier of the object in the attachment store.
        public_id -> Varchar,
        /// Upload order within the incident.
        position -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(incident_attachments -> incidents (incident_id));
diesel::allow_tables_to_appear_in_same_query!(incident_attachments, incidents, users);
