//! Internal Diesel row structs for the `profiles` table.
//!
//! These types never leave the persistence layer. Conversion to and from the
//! domain happens in the repository.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::profiles;

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub properties: serde_json::Value,
    pub creation_date: DateTime<Utc>,
}

/// Column subset backing the read projection; the full name is derived.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileProjectionRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub properties: serde_json::Value,
}

/// Insertable struct for creating new profile records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub category: Option<&'a str>,
    pub properties: &'a serde_json::Value,
    pub creation_date: DateTime<Utc>,
}

/// Changeset for updating a stored profile. Omits `creation_date`, which is
/// immutable after insert.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileChangeset<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub category: Option<&'a str>,
    pub properties: &'a serde_json::Value,
}
