//! Wiring from settings to a ready [`ProfileService`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::info;

use crate::config::ProfileSettings;
use crate::domain::ProfileService;
use crate::outbound::memory::InMemoryProfileRepository;
use crate::outbound::persistence::{
    DbPool, DieselProfileRepository, MigrationError, PoolError, run_pending_migrations,
};
use crate::telemetry::{ParseLogFormatError, init_tracing};

/// Service backed by PostgreSQL.
pub type PostgresProfileService = ProfileService<DieselProfileRepository>;

/// Service backed by the in-process store.
pub type InMemoryProfileService = ProfileService<InMemoryProfileRepository>;

/// Errors returned while starting the profile service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// `log_format` named an unknown format.
    #[error("invalid settings: {0}")]
    LogFormat(#[from] ParseLogFormatError),
    /// Embedded migrations failed.
    #[error(transparent)]
    Migration(#[from] MigrationError),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    MigrationTask(#[from] tokio::task::JoinError),
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Start the PostgreSQL-backed service from `settings`.
///
/// Installs tracing, applies migrations when `run_migrations` is set, then
/// builds the pool and repository.
///
/// # Errors
///
/// See [`BootstrapError`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::ffi::OsString;
///
/// use ortho_config::OrthoConfig;
/// use profile_backend::bootstrap::start;
/// use profile_backend::config::ProfileSettings;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ProfileSettings::load_from_iter([OsString::from("profile-backend")])?;
/// let service = start(&settings).await?;
/// # let _ = service;
/// # Ok(())
/// # }
/// ```
pub async fn start(settings: &ProfileSettings) -> Result<PostgresProfileService, BootstrapError> {
    start_with_clock(settings, Arc::new(DefaultClock)).await
}

/// [`start`] with an explicit clock.
pub async fn start_with_clock(
    settings: &ProfileSettings,
    clock: Arc<dyn Clock>,
) -> Result<PostgresProfileService, BootstrapError> {
    init_tracing(settings.log_format()?);

    if settings.run_migrations {
        let url = settings.database_url().to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url)).await??;
        info!(applied = applied.len(), "database schema up to date");
    }

    let pool_config = settings.pool_config();
    info!(
        max_size = pool_config.max_size(),
        timeout_secs = pool_config.connection_timeout().as_secs(),
        "connecting profile store"
    );
    let pool = DbPool::new(pool_config).await?;
    let repository = Arc::new(DieselProfileRepository::new(pool, clock.clone()));
    Ok(ProfileService::new(repository, clock))
}

/// Service over a fresh in-process store sharing `clock`.
pub fn in_memory(clock: Arc<dyn Clock>) -> InMemoryProfileService {
    let repository = Arc::new(InMemoryProfileRepository::new(clock.clone()));
    ProfileService::new(repository, clock)
}
