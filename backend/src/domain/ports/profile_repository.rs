//! Port for profile persistence.
//!
//! The [`ProfileRepository`] trait is the only route from the domain to
//! stored profiles. Adapters own uniqueness of the email column and the
//! meaning of "current" for the calendar counts.

use async_trait::async_trait;

use crate::domain::{CreationWindow, EmailAddress, Profile, ProfileProjection};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "profile repository query failed: {message}",
        /// Insert or update hit the unique email constraint.
        DuplicateEmail { email: String } =>
            "a profile with email {email} already exists",
    }
}

/// Port for profile storage and retrieval.
///
/// # Save Semantics
///
/// [`ProfileRepository::save`] inserts when the profile has no identifier and
/// updates the row with that identifier otherwise. The returned profile
/// carries the identifier the store assigned.
///
/// # Calendar Counts
///
/// `count_by_year`, `count_by_quarter` and `count_by_month` count profiles
/// whose creation date falls in the calendar period containing the store's
/// current time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Every stored profile, in store order.
    async fn find_all(&self) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Fetch the full entity for `email`.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch only the projected view for `email`.
    async fn find_projection_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<ProfileProjection>, ProfileRepositoryError>;

    /// Insert or update a profile.
    ///
    /// Returns [`ProfileRepositoryError::DuplicateEmail`] when another profile
    /// already owns the email.
    async fn save(&self, profile: Profile) -> Result<Profile, ProfileRepositoryError>;

    /// Case-insensitive free-text search over emails, names, phone numbers
    /// and property values.
    async fn search(&self, term: &str) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Profiles created inside `window`.
    async fn find_by_creation_date_between(
        &self,
        window: &CreationWindow,
    ) -> Result<Vec<Profile>, ProfileRepositoryError>;

    /// Profiles created in the current calendar year.
    async fn count_by_year(&self) -> Result<u64, ProfileRepositoryError>;

    /// Profiles created in the current calendar quarter.
    async fn count_by_quarter(&self) -> Result<u64, ProfileRepositoryError>;

    /// Profiles created in the current calendar month.
    async fn count_by_month(&self) -> Result<u64, ProfileRepositoryError>;

    /// Profiles in the candidate category.
    async fn count_candidates(&self) -> Result<u64, ProfileRepositoryError>;

    /// Profiles in the consultant category.
    async fn count_consultants(&self) -> Result<u64, ProfileRepositoryError>;
}
