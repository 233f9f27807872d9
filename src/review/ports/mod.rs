//! Port contracts for pull request storage.

pub mod repository;

pub use repository::{
    PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult,
};
