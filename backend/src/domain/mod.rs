//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed profile entities and the service that
//! orchestrates them. Keep types transport agnostic and document invariants
//! and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - Profile, ProfileCreateRequest, ProfileProjection: entity and its
//!   request/read shapes.
//! - ProfileService: implements the `ProfileQuery` and `ProfileCommand`
//!   driving ports.

pub mod creation_window;
pub mod error;
pub mod ports;
pub mod profile;
pub mod profile_search;
pub mod profile_service;
pub mod profile_statistics;

pub use self::creation_window::{CreationWindow, CreationWindowError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::profile::{
    EMAIL_MAX, EmailAddress, ParseProfileCategoryError, Profile, ProfileBuilder, ProfileCategory,
    ProfileCreateRequest, ProfileId, ProfileProjection, ProfileProperties, ProfileValidationError,
};
pub use self::profile_search::{NO_RESULT_MESSAGE, SearchResults};
pub use self::profile_service::ProfileService;
pub use self::profile_statistics::{ProfileStatistics, StatisticLabel};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use profile_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
