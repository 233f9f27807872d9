//! Error types for pull request domain validation and parsing.

use super::PullRequestId;
use crate::directory::domain::UserId;
use thiserror::Error;

/// Errors returned while constructing or changing pull requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewDomainError {
    /// The pull request identifier is empty after trimming.
    #[error("pull request id must not be empty")]
    EmptyPullRequestId,

    /// The pull request identifier exceeds the storage limit.
    #[error("pull request id '{0}' exceeds 255 characters")]
    PullRequestIdTooLong(String),

    /// The pull request name is empty after trimming.
    #[error("pull request name must not be empty")]
    EmptyPullRequestName,

    /// The pull request name exceeds the storage limit.
    #[error("pull request name exceeds 255 characters")]
    PullRequestNameTooLong,

    /// The pull request has merged and its reviewers are frozen.
    #[error("pull request {0} is merged")]
    PullRequestMerged(PullRequestId),

    /// More reviewers were requested than a pull request may carry.
    #[error("at most {limit} reviewers may be assigned")]
    ReviewerLimitExceeded {
        /// Maximum number of reviewers.
        limit: usize,
    },

    /// The same reviewer appears more than once.
    #[error("reviewer {0} is listed more than once")]
    DuplicateReviewer(UserId),

    /// The author was listed as a reviewer of their own pull request.
    #[error("author {0} cannot review their own pull request")]
    AuthorAsReviewer(UserId),

    /// The reviewer is not assigned to the pull request.
    #[error("reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        /// Pull request identifier.
        pull_request_id: PullRequestId,
        /// Reviewer identifier.
        reviewer_id: UserId,
    },

    /// The pull request already has reviewers, so an explicit assignment is
    /// refused.
    #[error("pull request {0} already has reviewers")]
    ReviewersAlreadyAssigned(PullRequestId),

    /// Status and merge timestamp disagree.
    #[error("pull request {0} has an inconsistent merge state")]
    InconsistentMergeState(PullRequestId),
}

/// Error returned while parsing pull request statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pull request status: {0}")]
pub struct ParsePullRequestStatusError(pub String);
