//! Port contracts for the team and user directory.

pub mod repository;

pub use repository::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult};

#[cfg(test)]
pub use repository::MockDirectoryRepository;
