//! Profile service settings loaded via OrthoConfig.
//!
//! Values layer as defaults, then configuration file, then `PROFILES_*`
//! environment variables, then command-line flags. Every field is optional;
//! the accessors apply the fallbacks.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, PoolConfig,
};
use crate::telemetry::{LogFormat, ParseLogFormatError};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/profiles";

/// Settings for wiring the profile service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PROFILES")]
pub struct ProfileSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept open. Zero disables the floor.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout_secs: Option<u64>,
    /// `json` or `pretty`.
    pub log_format: Option<String>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

impl ProfileSettings {
    /// Return the configured database URL, falling back to a local default.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Return the configured log format, falling back to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ParseLogFormatError`] when the value names no known format.
    pub fn log_format(&self) -> Result<LogFormat, ParseLogFormatError> {
        self.log_format
            .as_deref()
            .map_or(Ok(LogFormat::default()), str::parse)
    }

    /// Pool settings derived from the database fields.
    pub fn pool_config(&self) -> PoolConfig {
        let min_idle = match self.pool_min_idle {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_MIN_IDLE),
        };
        let timeout = self
            .connection_timeout_secs
            .map_or(DEFAULT_CONNECTION_TIMEOUT, Duration::from_secs);

        PoolConfig::new(self.database_url())
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_MAX_SIZE))
            .with_min_idle(min_idle)
            .with_connection_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "PROFILES_DATABASE_URL",
        "PROFILES_POOL_MAX_SIZE",
        "PROFILES_POOL_MIN_IDLE",
        "PROFILES_CONNECTION_TIMEOUT_SECS",
        "PROFILES_LOG_FORMAT",
        "PROFILES_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ProfileSettings {
        ProfileSettings::load_from_iter([OsString::from("profile-backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(settings.log_format(), Ok(LogFormat::Json));
        assert!(!settings.run_migrations);

        let pool = settings.pool_config();
        assert_eq!(pool.max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(pool.min_idle(), Some(DEFAULT_MIN_IDLE));
        assert_eq!(pool.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "PROFILES_DATABASE_URL",
                Some("postgres://db.internal/crm".to_owned()),
            ),
            ("PROFILES_POOL_MAX_SIZE", Some("24".to_owned())),
            ("PROFILES_POOL_MIN_IDLE", Some("0".to_owned())),
            ("PROFILES_CONNECTION_TIMEOUT_SECS", Some("5".to_owned())),
            ("PROFILES_LOG_FORMAT", Some("pretty".to_owned())),
            ("PROFILES_RUN_MIGRATIONS", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), "postgres://db.internal/crm");
        assert_eq!(settings.log_format(), Ok(LogFormat::Pretty));
        assert!(settings.run_migrations);

        let pool = settings.pool_config();
        assert_eq!(pool.database_url(), "postgres://db.internal/crm");
        assert_eq!(pool.max_size(), 24);
        assert_eq!(pool.min_idle(), None);
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn unknown_log_format_is_rejected() {
        let _guard = lock_env(VARS.map(|name| match name {
            "PROFILES_LOG_FORMAT" => (name, Some("xml".to_owned())),
            _ => (name, None),
        }));

        let settings = load_from_empty_args();
        let err = settings.log_format().expect_err("xml is not a log format");
        assert!(err.to_string().contains("xml"));
    }
}
