//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. `diesel print-schema`
//! against a migrated database regenerates them.

diesel::table! {
    /// Identities, including soft-deleted and invited-but-unaccepted rows.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Text,
        validated -> Bool,
        validation_code -> Nullable<Varchar>,
        /// SHA-256 hex digest of the emailed reset token.
        reset_token -> Nullable<Varchar>,
        reset_expires_at -> Nullable<Timestamptz>,
        invite_code -> Nullable<Varchar>,
        invited_by -> Nullable<Uuid>,
        personal -> Nullable<Jsonb>,
        company -> Nullable<Jsonb>,
        role -> Varchar,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    clients (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        address -> Nullable<Text>,
        company_name -> Nullable<Varchar>,
        is_archived -> Bool,
        archived_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        owner_id -> Uuid,
        client_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        company_name -> Nullable<Varchar>,
        is_archived -> Bool,
        archived_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    delivery_notes (id) {
        id -> Uuid,
        project_id -> Uuid,
        owner_id -> Uuid,
        /// Line items as a JSON array of tagged objects.
        items -> Jsonb,
        is_signed -> Bool,
        signature_url -> Nullable<Text>,
        pdf_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(clients -> users (owner_id));
diesel::joinable!(projects -> clients (client_id));
diesel::joinable!(delivery_notes -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(users, clients, projects, delivery_notes);
