//! Outbound adapters implementing the profile repository port.
//!
//! - **persistence**: PostgreSQL via Diesel and a `bb8` pool.
//! - **memory**: mutex-guarded in-process store.
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules beyond those the port contract assigns them.

pub mod memory;
pub mod persistence;
