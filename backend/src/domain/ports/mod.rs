//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod profile_command;
mod profile_query;
mod profile_repository;

pub use profile_command::ProfileCommand;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
