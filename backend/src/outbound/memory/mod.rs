//! In-process `ProfileRepository` adapter.
//!
//! Keeps profiles in insertion order behind a mutex. It honours the same
//! contract as the PostgreSQL adapter (email uniqueness, insert-or-update on
//! save, calendar counts against the injected clock), which makes it the
//! default store for tests and local wiring.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    CreationWindow, CreationWindowError, EmailAddress, Profile, ProfileCategory, ProfileId,
    ProfileProjection,
};

/// Mutex-guarded, insertion-ordered profile store.
pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<Profile>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryProfileRepository {
    /// Create an empty store whose calendar counts use `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Profile>>, ProfileRepositoryError> {
        self.profiles
            .lock()
            .map_err(|_| ProfileRepositoryError::query("in-memory profile store poisoned"))
    }

    fn matching<F>(&self, predicate: F) -> Result<Vec<Profile>, ProfileRepositoryError>
    where
        F: Fn(&Profile) -> bool,
    {
        Ok(self
            .lock()?
            .iter()
            .filter(|profile| predicate(profile))
            .cloned()
            .collect())
    }

    fn count<F>(&self, predicate: F) -> Result<u64, ProfileRepositoryError>
    where
        F: Fn(&Profile) -> bool,
    {
        let count = self.lock()?.iter().filter(|profile| predicate(profile)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn count_in_current(
        &self,
        window: fn(chrono::DateTime<chrono::Utc>) -> Result<CreationWindow, CreationWindowError>,
    ) -> Result<u64, ProfileRepositoryError> {
        let window = window(self.clock.utc())
            .map_err(|err| ProfileRepositoryError::query(err.to_string()))?;
        self.count(|profile| window.contains(profile.creation_date()))
    }

    fn count_category(&self, category: ProfileCategory) -> Result<u64, ProfileRepositoryError> {
        self.count(|profile| profile.category() == Some(category))
    }
}

fn email_taken_by_other(
    profiles: &[Profile],
    email: &EmailAddress,
    own_id: Option<&ProfileId>,
) -> bool {
    profiles
        .iter()
        .any(|profile| profile.email() == email && profile.id() != own_id)
}

fn matches_term(profile: &Profile, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
    contains(profile.email().as_ref())
        || contains(profile.first_name())
        || contains(profile.last_name())
        || profile.phone().is_some_and(contains)
        || profile.properties().value_texts().any(|text| contains(&text))
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_all(&self) -> Result<Vec<Profile>, ProfileRepositoryError> {
        Ok(self.lock()?.clone())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .find(|profile| profile.email() == email)
            .cloned())
    }

    async fn find_projection_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<ProfileProjection>, ProfileRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .find(|profile| profile.email() == email)
            .map(ProfileProjection::from))
    }

    async fn save(&self, profile: Profile) -> Result<Profile, ProfileRepositoryError> {
        let mut profiles = self.lock()?;
        if email_taken_by_other(&profiles, profile.email(), profile.id()) {
            return Err(ProfileRepositoryError::duplicate_email(
                profile.email().as_ref(),
            ));
        }

        let Some(id) = profile.id().copied() else {
            let inserted = profile.with_id(ProfileId::random());
            debug!(id = ?inserted.id(), "inserted profile in memory");
            profiles.push(inserted.clone());
            return Ok(inserted);
        };

        let slot = profiles
            .iter_mut()
            .find(|stored| stored.id() == Some(&id))
            .ok_or_else(|| ProfileRepositoryError::query(format!("profile {id} not found")))?;
        *slot = profile.clone();
        Ok(profile)
    }

    async fn search(&self, term: &str) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let needle = term.to_lowercase();
        self.matching(|profile| matches_term(profile, &needle))
    }

    async fn find_by_creation_date_between(
        &self,
        window: &CreationWindow,
    ) -> Result<Vec<Profile>, ProfileRepositoryError> {
        self.matching(|profile| window.contains(profile.creation_date()))
    }

    async fn count_by_year(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_in_current(CreationWindow::year_containing)
    }

    async fn count_by_quarter(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_in_current(CreationWindow::quarter_containing)
    }

    async fn count_by_month(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_in_current(CreationWindow::month_containing)
    }

    async fn count_candidates(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_category(ProfileCategory::Candidate)
    }

    async fn count_consultants(&self) -> Result<u64, ProfileRepositoryError> {
        self.count_category(ProfileCategory::Consultant)
    }
}
