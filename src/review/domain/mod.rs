//! Domain model for pull requests and their reviewers.
//!
//! A pull request is either `OPEN` or `MERGED`. While open it carries up to
//! two distinct reviewers, none of whom is its author. Merging freezes the
//! reviewer set and records the merge time exactly once.

mod error;
mod ids;
mod pull_request;
mod reviewer_set;
mod status;

pub use error::{ParsePullRequestStatusError, ReviewDomainError};
pub use ids::PullRequestId;
pub use pull_request::{
    PersistedPullRequestData, PullRequest, PullRequestSummary, stored_timestamp,
};
pub use reviewer_set::{MAX_REVIEWERS, ReviewerSet};
pub use status::PullRequestStatus;
