//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{EmailAddress, ProfileCategory, ProfileCreateRequest, ProfileProperties};

/// Instant every fixture clock starts at: 2026-02-14 09:00:00 UTC.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("fixture timestamp must be valid"))
}

/// Clock that stays put until moved explicitly.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock frozen at [`fixture_timestamp`].
    pub fn at_fixture_time() -> Self {
        Self::new(fixture_timestamp())
    }

    /// Move the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock_clock() = instant;
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Parse a fixture email, panicking on invalid input.
pub fn email(raw: &str) -> EmailAddress {
    match EmailAddress::new(raw) {
        Ok(email) => email,
        Err(err) => panic!("fixture email {raw:?} is invalid: {err}"),
    }
}

/// Create request with a name, category and properties filled in.
pub fn profile_request(
    raw_email: &str,
    category: Option<ProfileCategory>,
    properties: ProfileProperties,
) -> ProfileCreateRequest {
    let mut request = ProfileCreateRequest::for_email(email(raw_email));
    let local_part = raw_email.split('@').next().unwrap_or_default();
    request.first_name = local_part.to_owned();
    request.last_name = "Fixture".to_owned();
    request.category = category;
    request.properties = properties;
    request
}
