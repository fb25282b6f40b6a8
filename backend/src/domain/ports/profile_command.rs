//! Driving port for profile writes.

use async_trait::async_trait;

use crate::domain::{Error, ProfileCreateRequest, ProfileProjection};

/// Domain use-case port for creating and updating profiles.
///
/// # Errors
///
/// - `create_profile` fails with [`crate::domain::ErrorCode::Conflict`] when
///   the email is already taken.
/// - `update_profile` fails with [`crate::domain::ErrorCode::NotFound`] when
///   no profile has the email, and with `ServiceUnavailable` or
///   `InternalError` when the store fails.
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Create a profile from `request`.
    async fn create_profile(&self, request: ProfileCreateRequest)
    -> Result<ProfileProjection, Error>;

    /// Overwrite the mapped fields of an existing profile and merge its
    /// properties.
    async fn update_profile(&self, request: ProfileCreateRequest)
    -> Result<ProfileProjection, Error>;
}
