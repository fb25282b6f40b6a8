//! Profile service library.
//!
//! Layout follows ports and adapters: `domain` holds the entities, the
//! service and its ports; `outbound` holds the PostgreSQL and in-memory
//! repository adapters; `config`, `telemetry` and `bootstrap` wire them up.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
