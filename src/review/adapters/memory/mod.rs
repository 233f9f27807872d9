//! In-memory pull request adapter.

mod pull_requests;

pub use pull_requests::InMemoryPullRequestRepository;
