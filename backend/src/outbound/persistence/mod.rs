//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! [`DieselProfileRepository`] implements the profile repository port over an
//! async `bb8` pool of `diesel-async` connections. Row structs (`models.rs`)
//! and table definitions (`schema.rs`) stay private to this module; only
//! domain types cross the boundary.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use profile_backend::outbound::persistence::{DbPool, DieselProfileRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), profile_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/profiles")).await?;
//! let repo = DieselProfileRepository::new(pool, Arc::new(DefaultClock));
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_profile_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_profile_repository::DieselProfileRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, DbPool, PoolConfig, PoolError,
};
