//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the `profiles_email_key` unique index, so a
//! racing insert surfaces as [`ProfileRepositoryError::DuplicateEmail`].
//! Calendar counts compute their windows from the injected clock and bind
//! them as parameters.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    CreationWindow, CreationWindowError, EmailAddress, Profile, ProfileCategory, ProfileId,
    ProfileProjection, ProfileProperties,
};

use super::models::{NewProfileRow, ProfileChangeset, ProfileProjectionRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselProfileRepository {
    /// Create a repository over `pool`; `clock` anchors the calendar counts.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn count_window(&self, window: &CreationWindow) -> Result<u64, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = profiles::table
            .filter(profiles::creation_date.ge(window.start()))
            .filter(profiles::creation_date.lt(window.end()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(count)
    }

    async fn count_current(
        &self,
        window: fn(chrono::DateTime<chrono::Utc>) -> Result<CreationWindow, CreationWindowError>,
    ) -> Result<u64, ProfileRepositoryError> {
        let window = window(self.clock.utc())
            .map_err(|err| ProfileRepositoryError::query(err.to_string()))?;
        self.count_window(&window).await
    }

    async fn count_category(
        &self,
        category: ProfileCategory,
    ) -> Result<u64, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = profiles::table
            .filter(profiles::category.eq(category.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(count)
    }

    async fn insert(&self, profile: &Profile) -> Result<Profile, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let properties = profile.properties().to_json();

        let row = NewProfileRow {
            id: *ProfileId::random().as_uuid(),
            email: profile.email().as_ref(),
            first_name: profile.first_name(),
            last_name: profile.last_name(),
            phone: profile.phone(),
            category: profile.category().map(|category| category.as_str()),
            properties: &properties,
            creation_date: profile.creation_date(),
        };

        let inserted: ProfileRow = diesel::insert_into(profiles::table)
            .values(&row)
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_write_error(err, profile.email()))?;

        debug!(id = %inserted.id, "inserted profile row");
        row_to_profile(inserted)
    }

    async fn update(
        &self,
        id: ProfileId,
        profile: &Profile,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let properties = profile.properties().to_json();

        let changeset = ProfileChangeset {
            email: profile.email().as_ref(),
            first_name: profile.first_name(),
            last_name: profile.last_name(),
            phone: profile.phone(),
            category: profile.category().map(|category| category.as_str()),
            properties: &properties,
        };

        let updated: Option<ProfileRow> = diesel::update(profiles::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, profile.email()))?;

        let row = updated
            .ok_or_else(|| ProfileRepositoryError::query(format!("profile {id} not found")))?;
        row_to_profile(row)
    }
}

/// Map pool errors to domain profile repository errors.
fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ProfileRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain profile repository errors.
fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ProfileRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => ProfileRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ProfileRepositoryError::connection("database connection error")
        }
        _ => ProfileRepositoryError::query("database error"),
    }
}

/// Writes additionally translate the email unique index violation.
fn map_write_error(error: diesel::result::Error, email: &EmailAddress) -> ProfileRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            debug!(
                constraint = info.constraint_name(),
                %email,
                "profile email already taken"
            );
            ProfileRepositoryError::duplicate_email(email.as_ref())
        }
        other => map_diesel_error(other),
    }
}

fn count_to_u64(count: i64) -> Result<u64, ProfileRepositoryError> {
    u64::try_from(count)
        .map_err(|_| ProfileRepositoryError::query(format!("negative row count {count}")))
}

/// Build a `%term%` ILIKE pattern, escaping the LIKE metacharacters.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Matches when any property value, keys excluded, is ILIKE the bound pattern.
const PROPERTY_VALUE_MATCH_SQL: &str =
    "EXISTS (SELECT 1 FROM jsonb_each_text(profiles.properties) AS prop WHERE prop.value ILIKE ";

fn parse_category(raw: Option<&str>) -> Result<Option<ProfileCategory>, ProfileRepositoryError> {
    raw.map(str::parse)
        .transpose()
        .map_err(|err| {
            ProfileRepositoryError::query(format!("invalid category in database: {err}"))
        })
}

fn parse_email(raw: &str) -> Result<EmailAddress, ProfileRepositoryError> {
    EmailAddress::new(raw)
        .map_err(|err| ProfileRepositoryError::query(format!("invalid email in database: {err}")))
}

fn parse_properties(raw: serde_json::Value) -> Result<ProfileProperties, ProfileRepositoryError> {
    ProfileProperties::try_from(raw).map_err(|err| {
        ProfileRepositoryError::query(format!("invalid properties in database: {err}"))
    })
}

/// Convert a database row to a domain profile.
fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    Ok(Profile::builder(parse_email(&row.email)?, row.creation_date)
        .id(ProfileId::from_uuid(row.id))
        .first_name(row.first_name)
        .last_name(row.last_name)
        .phone(row.phone)
        .category(parse_category(row.category.as_deref())?)
        .properties(parse_properties(row.properties)?)
        .build())
}

fn row_to_projection(
    row: ProfileProjectionRow,
) -> Result<ProfileProjection, ProfileRepositoryError> {
    Ok(ProfileProjection {
        id: Some(ProfileId::from_uuid(row.id)),
        email: parse_email(&row.email)?,
        full_name: ProfileProjection::full_name_of(&row.first_name, &row.last_name),
        first_name: row.first_name,
        last_name: row.last_name,
        phone: row.phone,
        category: parse_category(row.category.as_deref())?,
        properties: parse_properties(row.properties)?,
    })
}

fn rows_to_profiles(rows: Vec<ProfileRow>) -> Result<Vec<Profile>, ProfileRepositoryError> {
    rows.into_iter().map(row_to_profile).collect()
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn find_all(&self) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = profiles::table
            .order((profiles::creation_date.asc(), profiles::id.asc()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = profiles::table
            .filter(profiles::email.eq(email.as_ref()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_profile).transpose()
    }

    async fn find_projection_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<ProfileProjection>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileProjectionRow> = profiles::table
            .filter(profiles::email.eq(email.as_ref()))
            .select(ProfileProjectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_projection).transpose()
    }

    async fn save(&self, profile: Profile) -> Result<Profile, ProfileRepositoryError> {
        match profile.id().copied() {
            None => self.insert(&profile).await,
            Some(id) => self.update(id, &profile).await,
        }
    }

    async fn search(&self, term: &str) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = contains_pattern(term);

        let rows: Vec<ProfileRow> = profiles::table
            .filter(
                profiles::email
                    .ilike(&pattern)
                    .or(profiles::first_name.ilike(&pattern))
                    .or(profiles::last_name.ilike(&pattern))
                    .or(sql::<Bool>(PROPERTY_VALUE_MATCH_SQL)
                        .bind::<Text, _>(&pattern)
                        .sql(")"))
                    .or(profiles::phone.ilike(&pattern)),
            )
            .order((profiles::creation_date.asc(), profiles::id.asc()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn find_by_creation_date_between(
        &self,
        window: &CreationWindow,
    ) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = profiles::table
            .filter(profiles::creation_date.ge(window.start()))
            .filter(profiles::creation_date.lt(window.end()))
            .order((profiles::creation_date.asc(), profiles::id.asc()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_profiles(rows)
    }

    async fn count_by_year(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_current(CreationWindow::year_containing).await
    }

    async fn count_by_quarter(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_current(CreationWindow::quarter_containing).await
    }

    async fn count_by_month(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_current(CreationWindow::month_containing).await
    }

    async fn count_candidates(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_category(ProfileCategory::Candidate).await
    }

    async fn count_consultants(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_category(ProfileCategory::Consultant).await
    }
}
