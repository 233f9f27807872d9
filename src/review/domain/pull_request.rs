//! Pull request aggregate root.

use super::{PullRequestId, PullRequestStatus, ReviewDomainError, ReviewerSet};
use crate::directory::domain::UserId;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::Serialize;

const MAX_NAME_LENGTH: usize = 255;
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Reads `clock` truncated to the microsecond precision the stores keep.
///
/// Timestamps handed back to callers must equal the ones read back later.
#[must_use]
pub fn stored_timestamp(clock: &impl Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// A pull request and its assigned reviewers.
///
/// Reviewers never include the author and never exceed
/// [`MAX_REVIEWERS`](super::MAX_REVIEWERS). Once merged, the reviewer set is
/// frozen and the merge timestamp never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    #[serde(rename = "pull_request_id")]
    id: PullRequestId,
    #[serde(rename = "pull_request_name")]
    name: String,
    author_id: UserId,
    status: PullRequestStatus,
    #[serde(rename = "assigned_reviewers")]
    reviewers: ReviewerSet,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt")]
    merged_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a stored pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPullRequestData {
    /// Pull request identifier.
    pub id: PullRequestId,
    /// Human-readable title.
    pub name: String,
    /// Author identifier.
    pub author_id: UserId,
    /// Lifecycle status.
    pub status: PullRequestStatus,
    /// Assigned reviewers.
    pub reviewers: Vec<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Creates an open pull request with an initial reviewer set.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError`] when the name is invalid or the reviewer
    /// list breaks the reviewer-set rules.
    pub fn new(
        id: PullRequestId,
        name: impl Into<String>,
        author_id: UserId,
        reviewers: impl IntoIterator<Item = UserId>,
        clock: &impl Clock,
    ) -> Result<Self, ReviewDomainError> {
        let raw_name: String = name.into();
        let title = validate_name(&raw_name)?;
        let reviewer_set = ReviewerSet::for_author(&author_id, reviewers)?;
        Ok(Self {
            id,
            name: title,
            author_id,
            status: PullRequestStatus::Open,
            reviewers: reviewer_set,
            created_at: stored_timestamp(clock),
            merged_at: None,
        })
    }

    /// Reconstructs a pull request from storage, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError`] when the stored values violate an
    /// aggregate invariant.
    pub fn from_persisted(data: PersistedPullRequestData) -> Result<Self, ReviewDomainError> {
        let reviewers = ReviewerSet::for_author(&data.author_id, data.reviewers)?;
        let pull_request = Self {
            id: data.id,
            name: data.name,
            author_id: data.author_id,
            status: data.status,
            reviewers,
            created_at: data.created_at,
            merged_at: data.merged_at,
        };
        pull_request.validate()?;
        Ok(pull_request)
    }

    /// Checks the aggregate invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::EmptyPullRequestName`] when the name is
    /// blank or [`ReviewDomainError::InconsistentMergeState`] when the status
    /// and merge timestamp disagree.
    pub fn validate(&self) -> Result<(), ReviewDomainError> {
        if self.name.trim().is_empty() {
            return Err(ReviewDomainError::EmptyPullRequestName);
        }
        if self.is_merged() != self.merged_at.is_some() {
            return Err(ReviewDomainError::InconsistentMergeState(self.id.clone()));
        }
        if self.reviewers.contains(&self.author_id) {
            return Err(ReviewDomainError::AuthorAsReviewer(self.author_id.clone()));
        }
        Ok(())
    }

    /// Returns the pull request identifier.
    #[must_use]
    pub const fn id(&self) -> &PullRequestId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the author identifier.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> PullRequestStatus {
        self.status
    }

    /// Returns the assigned reviewers.
    #[must_use]
    pub const fn reviewers(&self) -> &ReviewerSet {
        &self.reviewers
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the merge timestamp, if merged.
    #[must_use]
    pub const fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.merged_at
    }

    /// Returns whether the pull request has merged.
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        matches!(self.status, PullRequestStatus::Merged)
    }

    /// Returns whether `reviewer` is assigned.
    #[must_use]
    pub fn has_reviewer(&self, reviewer: &UserId) -> bool {
        self.reviewers.contains(reviewer)
    }

    /// Fails when the pull request has merged.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::PullRequestMerged`] when merged.
    pub fn ensure_open(&self) -> Result<(), ReviewDomainError> {
        if self.is_merged() {
            return Err(ReviewDomainError::PullRequestMerged(self.id.clone()));
        }
        Ok(())
    }

    /// Adds a reviewer. Adding an already assigned reviewer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::PullRequestMerged`] when merged,
    /// [`ReviewDomainError::AuthorAsReviewer`] when `reviewer` is the author,
    /// or [`ReviewDomainError::ReviewerLimitExceeded`] when the set is full.
    pub fn add_reviewer(&mut self, reviewer: UserId) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        if self.reviewers.contains(&reviewer) {
            return Ok(());
        }
        self.reviewers.insert(&self.author_id, reviewer)
    }

    /// Removes a reviewer.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::PullRequestMerged`] when merged or
    /// [`ReviewDomainError::ReviewerNotAssigned`] when `reviewer` is absent.
    pub fn remove_reviewer(&mut self, reviewer: &UserId) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        if !self.reviewers.remove(reviewer) {
            return Err(ReviewDomainError::ReviewerNotAssigned {
                pull_request_id: self.id.clone(),
                reviewer_id: reviewer.clone(),
            });
        }
        Ok(())
    }

    /// Swaps `old` for `new`, leaving the set unchanged on failure.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`Self::remove_reviewer`] or
    /// [`Self::add_reviewer`]. `new` must not already be assigned.
    pub fn replace_reviewer(&mut self, old: &UserId, new: UserId) -> Result<(), ReviewDomainError> {
        if self.reviewers.contains(&new) {
            return Err(ReviewDomainError::DuplicateReviewer(new));
        }
        let mut updated = self.clone();
        updated.remove_reviewer(old)?;
        updated.add_reviewer(new)?;
        *self = updated;
        Ok(())
    }

    /// Assigns an initial reviewer set to a pull request that has none.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::PullRequestMerged`] when merged,
    /// [`ReviewDomainError::ReviewersAlreadyAssigned`] when reviewers are
    /// present, or a reviewer-set error for an invalid list.
    pub fn assign_reviewers(
        &mut self,
        reviewers: impl IntoIterator<Item = UserId>,
    ) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        if !self.reviewers.is_empty() {
            return Err(ReviewDomainError::ReviewersAlreadyAssigned(self.id.clone()));
        }
        self.reviewers = ReviewerSet::for_author(&self.author_id, reviewers)?;
        Ok(())
    }

    /// Marks the pull request merged at `merged_at`.
    ///
    /// Returns `true` on the transition and `false` when it had already
    /// merged, in which case the original merge timestamp is kept.
    pub fn merge(&mut self, merged_at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PullRequestStatus::Merged;
        self.merged_at = Some(merged_at);
        true
    }

    /// Returns the list-view projection of this pull request.
    #[must_use]
    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// List-view projection of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    #[serde(rename = "pull_request_id")]
    id: PullRequestId,
    #[serde(rename = "pull_request_name")]
    name: String,
    author_id: UserId,
    status: PullRequestStatus,
}

impl PullRequestSummary {
    /// Creates a summary from its parts.
    #[must_use]
    pub const fn new(
        id: PullRequestId,
        name: String,
        author_id: UserId,
        status: PullRequestStatus,
    ) -> Self {
        Self {
            id,
            name,
            author_id,
            status,
        }
    }

    /// Returns the pull request identifier.
    #[must_use]
    pub const fn id(&self) -> &PullRequestId {
        &self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the author identifier.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> PullRequestStatus {
        self.status
    }
}

fn validate_name(name: &str) -> Result<String, ReviewDomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ReviewDomainError::EmptyPullRequestName);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ReviewDomainError::PullRequestNameTooLong);
    }
    Ok(trimmed.to_owned())
}
