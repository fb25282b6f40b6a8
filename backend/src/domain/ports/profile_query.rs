//! Driving port for profile reads.
//!
//! Inbound adapters use this port to read profiles without importing
//! persistence details.

use async_trait::async_trait;

use crate::domain::{
    CreationWindow, EmailAddress, Error, Profile, ProfileProjection, ProfileStatistics,
    SearchResults,
};

/// Domain use-case port for reading profiles.
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Every stored profile. An empty store yields an empty list.
    async fn get_all(&self) -> Result<Vec<Profile>, Error>;

    /// Projection of the profile keyed by `email`.
    ///
    /// Fails with [`crate::domain::ErrorCode::NotFound`] when no profile has
    /// that email.
    async fn get_by_email(&self, email: &EmailAddress) -> Result<ProfileProjection, Error>;

    /// Free-text search.
    async fn search(&self, term: &str) -> Result<SearchResults, Error>;

    /// The five labelled aggregate counts.
    async fn get_by_created_date_between(&self) -> Result<ProfileStatistics, Error>;

    /// Profiles created inside `window`.
    async fn list_created_between(&self, window: &CreationWindow) -> Result<Vec<Profile>, Error>;
}
