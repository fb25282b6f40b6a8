//! Profile domain service.
//!
//! [`ProfileService`] implements the profile driving ports on top of a
//! [`ProfileRepository`]. It holds no state of its own: uniqueness is checked
//! against the store, writes are delegated to it, and results are shaped into
//! projections, search results or statistics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    ProfileCommand, ProfileQuery, ProfileRepository, ProfileRepositoryError,
};
use crate::domain::{
    CreationWindow, EmailAddress, Error, Profile, ProfileCreateRequest, ProfileProjection,
    ProfileStatistics, SearchResults,
};

fn map_repository_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
        ProfileRepositoryError::DuplicateEmail { email } => already_exists(&email),
    }
}

fn already_exists(email: &str) -> Error {
    Error::conflict(format!("{email} already exists")).with_details(json!({ "email": email }))
}

fn does_not_exist(email: &EmailAddress) -> Error {
    Error::not_found(format!("{email} does not exist"))
        .with_details(json!({ "email": email.as_ref() }))
}

/// Store failures during an update keep their transport category but say
/// which profile they were updating.
fn update_failed(email: &EmailAddress, cause: ProfileRepositoryError) -> Error {
    error!(%email, error = %cause, "profile update failed");
    match cause {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("failed to update profile {email}: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("failed to update profile {email}: {message}"))
        }
        ProfileRepositoryError::DuplicateEmail { email } => already_exists(&email),
    }
}

/// Profile service implementing the query and command driving ports.
#[derive(Clone)]
pub struct ProfileService<R> {
    profile_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ProfileService<R> {
    /// Create a new service over the given repository.
    ///
    /// The clock stamps the creation date of new profiles.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use profile_backend::domain::ProfileService;
    /// # use profile_backend::domain::ports::ProfileQuery;
    /// # use profile_backend::outbound::memory::InMemoryProfileRepository;
    /// # async fn example() -> Result<(), profile_backend::domain::Error> {
    /// let clock = Arc::new(DefaultClock);
    /// let repository = Arc::new(InMemoryProfileRepository::new(clock.clone()));
    /// let service = ProfileService::new(repository, clock);
    /// let profiles = service.get_all().await?;
    /// assert!(profiles.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(profile_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profile_repo,
            clock,
        }
    }
}

#[async_trait]
impl<R> ProfileQuery for ProfileService<R>
where
    R: ProfileRepository,
{
    async fn get_all(&self) -> Result<Vec<Profile>, Error> {
        let profiles = self
            .profile_repo
            .find_all()
            .await
            .map_err(map_repository_error)?;
        debug!(count = profiles.len(), "listed profiles");
        Ok(profiles)
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<ProfileProjection, Error> {
        let projection = self
            .profile_repo
            .find_projection_by_email(email)
            .await
            .map_err(map_repository_error)?;

        projection.ok_or_else(|| {
            debug!(%email, "profile lookup missed");
            does_not_exist(email)
        })
    }

    async fn search(&self, term: &str) -> Result<SearchResults, Error> {
        let matches = self
            .profile_repo
            .search(term)
            .await
            .map_err(map_repository_error)?;
        debug!(term, count = matches.len(), "profile search finished");
        Ok(SearchResults::from_matches(matches))
    }

    async fn get_by_created_date_between(&self) -> Result<ProfileStatistics, Error> {
        let repo = &self.profile_repo;
        let (this_year, this_quarter, this_month, candidates, consultants) = tokio::try_join!(
            repo.count_by_year(),
            repo.count_by_quarter(),
            repo.count_by_month(),
            repo.count_candidates(),
            repo.count_consultants(),
        )
        .map_err(map_repository_error)?;

        Ok(ProfileStatistics {
            this_year,
            this_quarter,
            this_month,
            candidates,
            consultants,
        })
    }

    async fn list_created_between(&self, window: &CreationWindow) -> Result<Vec<Profile>, Error> {
        self.profile_repo
            .find_by_creation_date_between(window)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> ProfileCommand for ProfileService<R>
where
    R: ProfileRepository,
{
    async fn create_profile(
        &self,
        request: ProfileCreateRequest,
    ) -> Result<ProfileProjection, Error> {
        let existing = self
            .profile_repo
            .find_by_email(&request.email)
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            warn!(email = %request.email, "profile already exists");
            return Err(already_exists(request.email.as_ref()));
        }

        // The store's unique constraint still decides races between
        // concurrent creates; its DuplicateEmail maps to the same conflict.
        let profile = Profile::from_request(request, self.clock.utc());
        let saved = self
            .profile_repo
            .save(profile)
            .await
            .map_err(map_repository_error)?;

        info!(email = %saved.email(), id = ?saved.id(), "profile created");
        Ok(saved.projection())
    }

    async fn update_profile(
        &self,
        request: ProfileCreateRequest,
    ) -> Result<ProfileProjection, Error> {
        info!(email = %request.email, "updating profile");

        let Some(mut profile) = self
            .profile_repo
            .find_by_email(&request.email)
            .await
            .map_err(|err| update_failed(&request.email, err))?
        else {
            warn!(email = %request.email, "profile not found for update");
            return Err(does_not_exist(&request.email));
        };

        profile.apply_request(&request);
        profile.merge_properties(request.properties);

        let saved = self
            .profile_repo
            .save(profile)
            .await
            .map_err(|err| update_failed(&request.email, err))?;

        info!(email = %saved.email(), "profile updated");
        Ok(saved.projection())
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
