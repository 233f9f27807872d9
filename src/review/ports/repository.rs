//! Repository port for pull requests and reviewer assignments.

use crate::directory::domain::UserId;
use crate::review::domain::{PullRequest, PullRequestId, PullRequestStatus, PullRequestSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for pull request repository operations.
pub type PullRequestRepositoryResult<T> = Result<T, PullRequestRepositoryError>;

/// Pull request persistence contract.
///
/// Every write is one transactional unit: the pull request row and its
/// reviewer rows change together or not at all. Reviewer rows are written in
/// ascending reviewer order.
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Stores a new pull request together with its initial reviewers.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::DuplicatePullRequest`] when the
    /// identifier is taken or [`PullRequestRepositoryError::UnknownUser`] when
    /// the author or a reviewer does not exist.
    async fn create(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()>;

    /// Finds a pull request with its reviewers.
    ///
    /// Returns `None` when the pull request does not exist.
    async fn find_by_id(
        &self,
        id: &PullRequestId,
    ) -> PullRequestRepositoryResult<Option<PullRequest>>;

    /// Marks a pull request merged with a single conditional write.
    ///
    /// Merging an already merged pull request changes nothing and returns
    /// the stored state, keeping the original merge timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::NotFound`] when the pull request
    /// does not exist.
    async fn merge(
        &self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<PullRequest>;

    /// Swaps `old` for `new` in one unit.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::NotFound`],
    /// [`PullRequestRepositoryError::AlreadyMerged`],
    /// [`PullRequestRepositoryError::ReviewerNotAssigned`], or
    /// [`PullRequestRepositoryError::ReviewerAlreadyAssigned`] when the
    /// stored state no longer permits the swap.
    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()>;

    /// Assigns reviewers to a pull request that has none, in one unit.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::ReviewersAlreadyAssigned`] when
    /// the pull request already has reviewers, checked inside the unit.
    async fn assign_reviewers(
        &self,
        id: &PullRequestId,
        reviewers: &[UserId],
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()>;

    /// Returns the reviewers of a pull request in identifier order.
    async fn reviewers(&self, id: &PullRequestId) -> PullRequestRepositoryResult<Vec<UserId>>;

    /// Returns summaries of every pull request `reviewer` is assigned to,
    /// oldest first.
    async fn find_by_reviewer(
        &self,
        reviewer: &UserId,
    ) -> PullRequestRepositoryResult<Vec<PullRequestSummary>>;

    /// Returns whether a pull request exists.
    async fn exists(&self, id: &PullRequestId) -> PullRequestRepositoryResult<bool>;

    /// Returns the number of pull requests.
    async fn count(&self) -> PullRequestRepositoryResult<u64>;

    /// Returns the number of pull requests in `status`.
    async fn count_by_status(
        &self,
        status: PullRequestStatus,
    ) -> PullRequestRepositoryResult<u64>;
}

/// Errors returned by pull request repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PullRequestRepositoryError {
    /// A pull request with the same identifier already exists.
    #[error("duplicate pull request identifier: {0}")]
    DuplicatePullRequest(PullRequestId),

    /// The pull request was not found.
    #[error("pull request not found: {0}")]
    NotFound(PullRequestId),

    /// The pull request has merged and its reviewers are frozen.
    #[error("pull request {0} is merged")]
    AlreadyMerged(PullRequestId),

    /// The pull request already has reviewers.
    #[error("pull request {0} already has reviewers")]
    ReviewersAlreadyAssigned(PullRequestId),

    /// The reviewer to replace is not assigned.
    #[error("reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        /// Pull request identifier.
        pull_request_id: PullRequestId,
        /// Reviewer identifier.
        reviewer_id: UserId,
    },

    /// The replacement reviewer is already assigned.
    #[error("reviewer {reviewer_id} is already assigned to pull request {pull_request_id}")]
    ReviewerAlreadyAssigned {
        /// Pull request identifier.
        pull_request_id: PullRequestId,
        /// Reviewer identifier.
        reviewer_id: UserId,
    },

    /// More reviewers were supplied than a pull request may carry.
    #[error("too many reviewers for pull request {0}")]
    ReviewerLimitExceeded(PullRequestId),

    /// A referenced author or reviewer does not exist.
    #[error("unknown user reference: {0}")]
    UnknownUser(String),

    /// The unit did not finish within its deadline and was rolled back.
    #[error("transaction exceeded its {0:?} deadline")]
    Timeout(Duration),

    /// Stored data could not be converted into domain values.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PullRequestRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a conversion error raised while reading stored rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }
}
