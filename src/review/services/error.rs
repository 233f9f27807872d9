//! Service-level error taxonomy for reviewer assignment.

use crate::directory::{
    domain::{DirectoryDomainError, TeamName, UserId},
    ports::DirectoryRepositoryError,
};
use crate::error_code::ErrorCode;
use crate::review::{
    domain::{ParsePullRequestStatusError, PullRequestId, ReviewDomainError},
    ports::PullRequestRepositoryError,
};
use std::sync::Arc;
use thiserror::Error;

/// Every failure a reviewer-assignment operation can report.
///
/// Storage failures, timeouts, and unexpected conflicts collapse into
/// [`ReviewServiceError::Internal`], the only retryable kind.
#[derive(Debug, Clone, Error)]
pub enum ReviewServiceError {
    /// The request is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored status value is not recognised.
    #[error("invalid pull request status: {0}")]
    InvalidStatus(String),

    /// A pull request with the identifier already exists.
    #[error("pull request already exists: {0}")]
    PullRequestExists(PullRequestId),

    /// The pull request does not exist.
    #[error("pull request not found: {0}")]
    PullRequestNotFound(PullRequestId),

    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The team does not exist.
    #[error("team not found: {0}")]
    TeamNotFound(TeamName),

    /// The pull request has merged and its reviewers are frozen.
    #[error("pull request is already merged: {0}")]
    PullRequestMerged(PullRequestId),

    /// The reviewer is not assigned to the pull request.
    #[error("reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        /// Pull request identifier.
        pull_request_id: PullRequestId,
        /// Reviewer identifier.
        reviewer_id: UserId,
    },

    /// No eligible reviewer could be found.
    #[error("no available reviewer for pull request {0}")]
    NoAvailableReviewer(PullRequestId),

    /// The pull request already has reviewers.
    #[error("reviewers already assigned to pull request {0}")]
    ReviewersAlreadyAssigned(PullRequestId),

    /// The requested reviewer is not in the author's team.
    #[error("reviewer {reviewer_id} is not in team {team_name}")]
    ReviewerNotInTeam {
        /// Reviewer identifier.
        reviewer_id: UserId,
        /// The author's team.
        team_name: TeamName,
    },

    /// The author was requested as a reviewer.
    #[error("author {0} cannot review their own pull request")]
    AuthorAsReviewer(UserId),

    /// The requested reviewer is inactive.
    #[error("user {0} is not active")]
    UserNotActive(UserId),

    /// Storage failed, a unit timed out, or a concurrent write conflicted.
    #[error("internal error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReviewServiceError {
    /// Returns the caller-facing error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PullRequestExists(_) => ErrorCode::PrExists,
            Self::PullRequestMerged(_) => ErrorCode::PrMerged,
            Self::ReviewerNotAssigned { .. } => ErrorCode::NotAssigned,
            Self::NoAvailableReviewer(_) => ErrorCode::NoCandidate,
            Self::ReviewersAlreadyAssigned(_) => ErrorCode::ReviewersAssigned,
            Self::PullRequestNotFound(_) | Self::UserNotFound(_) | Self::TeamNotFound(_) => {
                ErrorCode::NotFound
            }
            Self::InvalidInput(_)
            | Self::InvalidStatus(_)
            | Self::ReviewerNotInTeam { .. }
            | Self::AuthorAsReviewer(_)
            | Self::UserNotActive(_) => ErrorCode::BadRequest,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Wraps an unexpected failure.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<ReviewDomainError> for ReviewServiceError {
    fn from(err: ReviewDomainError) -> Self {
        match err {
            ReviewDomainError::PullRequestMerged(id) => Self::PullRequestMerged(id),
            ReviewDomainError::AuthorAsReviewer(id) => Self::AuthorAsReviewer(id),
            ReviewDomainError::ReviewersAlreadyAssigned(id) => Self::ReviewersAlreadyAssigned(id),
            ReviewDomainError::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            } => Self::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            },
            ReviewDomainError::InconsistentMergeState(_) => Self::internal(err),
            ReviewDomainError::EmptyPullRequestId
            | ReviewDomainError::PullRequestIdTooLong(_)
            | ReviewDomainError::EmptyPullRequestName
            | ReviewDomainError::PullRequestNameTooLong
            | ReviewDomainError::ReviewerLimitExceeded { .. }
            | ReviewDomainError::DuplicateReviewer(_) => Self::InvalidInput(err.to_string()),
        }
    }
}

impl From<ParsePullRequestStatusError> for ReviewServiceError {
    fn from(err: ParsePullRequestStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}

impl From<DirectoryDomainError> for ReviewServiceError {
    fn from(err: DirectoryDomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<PullRequestRepositoryError> for ReviewServiceError {
    fn from(err: PullRequestRepositoryError) -> Self {
        match err {
            PullRequestRepositoryError::DuplicatePullRequest(id) => Self::PullRequestExists(id),
            PullRequestRepositoryError::NotFound(id) => Self::PullRequestNotFound(id),
            PullRequestRepositoryError::AlreadyMerged(id) => Self::PullRequestMerged(id),
            PullRequestRepositoryError::ReviewersAlreadyAssigned(id) => {
                Self::ReviewersAlreadyAssigned(id)
            }
            PullRequestRepositoryError::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            } => Self::ReviewerNotAssigned {
                pull_request_id,
                reviewer_id,
            },
            PullRequestRepositoryError::ReviewerLimitExceeded(_)
            | PullRequestRepositoryError::UnknownUser(_) => Self::InvalidInput(err.to_string()),
            PullRequestRepositoryError::ReviewerAlreadyAssigned { .. }
            | PullRequestRepositoryError::Timeout(_)
            | PullRequestRepositoryError::InvalidPersistedData(_)
            | PullRequestRepositoryError::Persistence(_) => Self::internal(err),
        }
    }
}

impl From<DirectoryRepositoryError> for ReviewServiceError {
    fn from(err: DirectoryRepositoryError) -> Self {
        match err {
            DirectoryRepositoryError::TeamNotFound(name) => Self::TeamNotFound(name),
            DirectoryRepositoryError::DuplicateTeam(_)
            | DirectoryRepositoryError::Timeout(_)
            | DirectoryRepositoryError::InvalidPersistedData(_)
            | DirectoryRepositoryError::Persistence(_) => Self::internal(err),
        }
    }
}

/// Result type for reviewer-assignment operations.
pub type ReviewServiceResult<T> = Result<T, ReviewServiceError>;
