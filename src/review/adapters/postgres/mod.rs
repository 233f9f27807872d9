//! `PostgreSQL` adapter for pull request storage.

mod models;
mod repository;

pub use repository::PostgresPullRequestRepository;
