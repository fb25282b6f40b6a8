//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Contact profiles.
    ///
    /// `email` carries a unique index; `properties` is a JSON object of
    /// free-form attributes.
    profiles (id) {
        /// Primary key: UUID v4 assigned on insert.
        id -> Uuid,
        /// Lower-cased email address, unique across rows.
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        phone -> Nullable<Varchar>,
        /// `candidate`, `consultant` or NULL.
        category -> Nullable<Varchar>,
        properties -> Jsonb,
        /// Set once on insert; never updated.
        creation_date -> Timestamptz,
    }
}
