//! Reviewer-assignment orchestration.
//!
//! Provides [`ReviewAssignmentService`] which creates pull requests with
//! automatically chosen reviewers, merges them, swaps a single reviewer, and
//! assigns an initial reviewer set to pull requests that have none.

use super::{ReviewServiceError, ReviewServiceResult, ReviewerSelector};
use crate::directory::{
    domain::{User, UserId},
    ports::DirectoryRepository,
};
use crate::review::{
    domain::{
        MAX_REVIEWERS, PullRequest, PullRequestId, PullRequestStatus, PullRequestSummary,
        ReviewDomainError, stored_timestamp,
    },
    ports::PullRequestRepository,
};
use mockable::Clock;
use serde::Serialize;
use std::slice;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequestRequest {
    pull_request_id: String,
    name: String,
    author_id: String,
}

impl CreatePullRequestRequest {
    /// Creates a request with all required fields.
    #[must_use]
    pub fn new(
        pull_request_id: impl Into<String>,
        name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            name: name.into(),
            author_id: author_id.into(),
        }
    }
}

/// Request payload for replacing one reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignReviewerRequest {
    pull_request_id: String,
    old_reviewer_id: String,
}

impl ReassignReviewerRequest {
    /// Creates a request replacing `old_reviewer_id` on `pull_request_id`.
    #[must_use]
    pub fn new(pull_request_id: impl Into<String>, old_reviewer_id: impl Into<String>) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            old_reviewer_id: old_reviewer_id.into(),
        }
    }
}

/// Request payload for assigning an initial reviewer set.
///
/// Without explicit reviewers, reviewers are drawn from the author's team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignReviewersRequest {
    pull_request_id: String,
    reviewer_ids: Vec<String>,
}

impl AssignReviewersRequest {
    /// Creates a request that draws reviewers from the author's team.
    #[must_use]
    pub fn new(pull_request_id: impl Into<String>) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            reviewer_ids: Vec::new(),
        }
    }

    /// Sets explicit reviewers.
    #[must_use]
    pub fn with_reviewers(mut self, reviewer_ids: impl IntoIterator<Item = String>) -> Self {
        self.reviewer_ids = reviewer_ids.into_iter().collect();
        self
    }
}

/// Outcome of a reviewer swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    /// The pull request after the swap.
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    /// The reviewer that replaced the old one.
    pub replaced_by: UserId,
}

/// Aggregate counts across pull requests and the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    /// Number of pull requests.
    pub total_prs: u64,
    /// Number of open pull requests.
    pub open_prs: u64,
    /// Number of merged pull requests.
    pub merged_prs: u64,
    /// Number of teams.
    pub total_teams: u64,
    /// Number of users.
    pub total_users: u64,
    /// Number of active users.
    pub active_users: u64,
}

/// Reviewer-assignment orchestration service.
#[derive(Clone)]
pub struct ReviewAssignmentService<P, D, C>
where
    P: PullRequestRepository,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    pull_requests: Arc<P>,
    directory: Arc<D>,
    clock: Arc<C>,
    selector: Arc<ReviewerSelector>,
}

impl<P, D, C> ReviewAssignmentService<P, D, C>
where
    P: PullRequestRepository,
    D: DirectoryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new reviewer-assignment service.
    #[must_use]
    pub const fn new(
        pull_requests: Arc<P>,
        directory: Arc<D>,
        clock: Arc<C>,
        selector: Arc<ReviewerSelector>,
    ) -> Self {
        Self {
            pull_requests,
            directory,
            clock,
            selector,
        }
    }

    /// Opens a pull request and assigns up to two reviewers from the
    /// author's team.
    ///
    /// An author with no eligible teammates gets a pull request with no
    /// reviewers.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::InvalidInput`] for blank fields,
    /// [`ReviewServiceError::PullRequestExists`] when the identifier is
    /// taken, or [`ReviewServiceError::UserNotFound`] when the author does
    /// not exist.
    pub async fn create_pull_request(
        &self,
        request: CreatePullRequestRequest,
    ) -> ReviewServiceResult<PullRequest> {
        let CreatePullRequestRequest {
            pull_request_id,
            name,
            author_id,
        } = request;
        let id = PullRequestId::new(pull_request_id)?;
        if name.trim().is_empty() {
            return Err(ReviewDomainError::EmptyPullRequestName.into());
        }
        let author_key = UserId::new(author_id)?;

        info!(pr_id = %id, author_id = %author_key, "creating pull request");
        if self.pull_requests.exists(&id).await? {
            warn!(pr_id = %id, "pull request already exists");
            return Err(ReviewServiceError::PullRequestExists(id));
        }

        let author = self.find_user(&author_key).await?;
        let candidates = self
            .directory
            .active_users_by_team(author.team_name(), slice::from_ref(author.id()))
            .await?;
        let reviewers = self.selector.select(&candidates, MAX_REVIEWERS);

        let pull_request = PullRequest::new(id, name, author_key, reviewers, &*self.clock)?;
        self.pull_requests.create(&pull_request).await?;

        info!(
            pr_id = %pull_request.id(),
            reviewers_count = pull_request.reviewers().len(),
            "pull request created"
        );
        Ok(pull_request)
    }

    /// Merges a pull request. Merging twice returns the first merge result.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::PullRequestNotFound`] when the pull
    /// request does not exist.
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> ReviewServiceResult<PullRequest> {
        let id = PullRequestId::new(pull_request_id)?;
        let merged = self
            .pull_requests
            .merge(&id, stored_timestamp(self.clock.as_ref()))
            .await?;
        info!(pr_id = %id, merged_at = ?merged.merged_at(), "pull request merged");
        Ok(merged)
    }

    /// Replaces one reviewer with a random active member of that reviewer's
    /// team.
    ///
    /// # Errors
    ///
    /// Returns, in order of checking,
    /// [`ReviewServiceError::InvalidInput`],
    /// [`ReviewServiceError::PullRequestNotFound`],
    /// [`ReviewServiceError::PullRequestMerged`],
    /// [`ReviewServiceError::ReviewerNotAssigned`], or
    /// [`ReviewServiceError::NoAvailableReviewer`].
    pub async fn reassign_reviewer(
        &self,
        request: ReassignReviewerRequest,
    ) -> ReviewServiceResult<Reassignment> {
        let ReassignReviewerRequest {
            pull_request_id,
            old_reviewer_id,
        } = request;
        let id = PullRequestId::new(pull_request_id)?;
        let old_reviewer = UserId::new(old_reviewer_id)?;

        info!(pr_id = %id, old_reviewer_id = %old_reviewer, "reassigning reviewer");
        let mut pull_request = self.find_pull_request(&id).await?;
        pull_request.ensure_open()?;
        if !pull_request.has_reviewer(&old_reviewer) {
            return Err(ReviewServiceError::ReviewerNotAssigned {
                pull_request_id: id,
                reviewer_id: old_reviewer,
            });
        }

        let old_user = self.find_user(&old_reviewer).await?;
        let exclude: Vec<UserId> = std::iter::once(pull_request.author_id().clone())
            .chain(pull_request.reviewers().iter().cloned())
            .collect();
        let candidates = self
            .directory
            .active_users_by_team(old_user.team_name(), &exclude)
            .await?;
        let Some(replacement) = self.selector.select_one(&candidates) else {
            warn!(pr_id = %id, team_name = %old_user.team_name(), "no replacement reviewer");
            return Err(ReviewServiceError::NoAvailableReviewer(id));
        };

        pull_request.replace_reviewer(&old_reviewer, replacement.clone())?;
        self.pull_requests
            .reassign_reviewer(
                &id,
                &old_reviewer,
                &replacement,
                stored_timestamp(self.clock.as_ref()),
            )
            .await?;
        let refreshed = self.find_pull_request(&id).await?;

        info!(
            pr_id = %id,
            old_reviewer_id = %old_reviewer,
            new_reviewer_id = %replacement,
            "reviewer reassigned"
        );
        Ok(Reassignment {
            pull_request: refreshed,
            replaced_by: replacement,
        })
    }

    /// Assigns an initial reviewer set to a pull request with no reviewers.
    ///
    /// With no explicit reviewers, up to two are drawn from the author's
    /// team, and an empty pool is an error. Explicit reviewers must be
    /// active members of the author's team other than the author.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::PullRequestMerged`],
    /// [`ReviewServiceError::NoAvailableReviewer`],
    /// [`ReviewServiceError::InvalidInput`],
    /// [`ReviewServiceError::UserNotActive`],
    /// [`ReviewServiceError::ReviewerNotInTeam`],
    /// [`ReviewServiceError::AuthorAsReviewer`], or
    /// [`ReviewServiceError::ReviewersAlreadyAssigned`].
    pub async fn assign_reviewers(
        &self,
        request: AssignReviewersRequest,
    ) -> ReviewServiceResult<PullRequest> {
        let AssignReviewersRequest {
            pull_request_id,
            reviewer_ids,
        } = request;
        let id = PullRequestId::new(pull_request_id)?;

        info!(pr_id = %id, specified_count = reviewer_ids.len(), "assigning reviewers");
        let mut pull_request = self.find_pull_request(&id).await?;
        pull_request.ensure_open()?;
        if reviewer_ids.len() > MAX_REVIEWERS {
            return Err(ReviewDomainError::ReviewerLimitExceeded {
                limit: MAX_REVIEWERS,
            }
            .into());
        }

        let author = self.find_user(pull_request.author_id()).await?;
        let reviewers = if reviewer_ids.is_empty() {
            let candidates = self
                .directory
                .active_users_by_team(author.team_name(), slice::from_ref(author.id()))
                .await?;
            if candidates.is_empty() {
                warn!(pr_id = %id, team_name = %author.team_name(), "no eligible reviewers");
                return Err(ReviewServiceError::NoAvailableReviewer(id));
            }
            self.selector.select(&candidates, MAX_REVIEWERS)
        } else {
            self.validate_explicit_reviewers(&author, reviewer_ids).await?
        };

        pull_request.assign_reviewers(reviewers.iter().cloned())?;
        self.pull_requests
            .assign_reviewers(&id, &reviewers, stored_timestamp(self.clock.as_ref()))
            .await?;
        let refreshed = self.find_pull_request(&id).await?;

        info!(
            pr_id = %id,
            assigned_count = reviewers.len(),
            total_reviewers = refreshed.reviewers().len(),
            "reviewers assigned"
        );
        Ok(refreshed)
    }

    /// Returns a pull request with its reviewers.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::PullRequestNotFound`] when the pull
    /// request does not exist.
    pub async fn pull_request(&self, pull_request_id: &str) -> ReviewServiceResult<PullRequest> {
        let id = PullRequestId::new(pull_request_id)?;
        self.find_pull_request(&id).await
    }

    /// Returns the reviewers of a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::PullRequestNotFound`] when the pull
    /// request does not exist.
    pub async fn reviewers(&self, pull_request_id: &str) -> ReviewServiceResult<Vec<UserId>> {
        let id = PullRequestId::new(pull_request_id)?;
        if !self.pull_requests.exists(&id).await? {
            return Err(ReviewServiceError::PullRequestNotFound(id));
        }
        Ok(self.pull_requests.reviewers(&id).await?)
    }

    /// Returns summaries of the pull requests a user reviews.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::UserNotFound`] when the user does not
    /// exist.
    pub async fn pull_requests_for_reviewer(
        &self,
        user_id: &str,
    ) -> ReviewServiceResult<Vec<PullRequestSummary>> {
        let reviewer = UserId::new(user_id)?;
        self.find_user(&reviewer).await?;
        let summaries = self.pull_requests.find_by_reviewer(&reviewer).await?;
        info!(user_id = %reviewer, reviews_count = summaries.len(), "reviews listed");
        Ok(summaries)
    }

    /// Returns the number of pull requests with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::InvalidStatus`] when `status` is not
    /// `OPEN` or `MERGED`.
    pub async fn count_by_status(&self, status: &str) -> ReviewServiceResult<u64> {
        let parsed = PullRequestStatus::try_from(status)?;
        Ok(self.pull_requests.count_by_status(parsed).await?)
    }

    /// Returns aggregate counts.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewServiceError::Internal`] when a count fails.
    pub async fn stats(&self) -> ReviewServiceResult<ReviewStats> {
        let stats = ReviewStats {
            total_prs: self.pull_requests.count().await?,
            open_prs: self
                .pull_requests
                .count_by_status(PullRequestStatus::Open)
                .await?,
            merged_prs: self
                .pull_requests
                .count_by_status(PullRequestStatus::Merged)
                .await?,
            total_teams: self.directory.count_teams().await?,
            total_users: self.directory.count_users().await?,
            active_users: self.directory.count_active_users().await?,
        };
        info!(
            total_prs = stats.total_prs,
            total_teams = stats.total_teams,
            total_users = stats.total_users,
            "stats retrieved"
        );
        Ok(stats)
    }

    async fn validate_explicit_reviewers(
        &self,
        author: &User,
        reviewer_ids: Vec<String>,
    ) -> ReviewServiceResult<Vec<UserId>> {
        let mut reviewers = Vec::with_capacity(reviewer_ids.len());
        for raw in reviewer_ids {
            let reviewer_id = UserId::new(raw)?;
            let reviewer = self.find_user(&reviewer_id).await?;
            if !reviewer.is_active() {
                warn!(reviewer_id = %reviewer_id, "reviewer is not active");
                return Err(ReviewServiceError::UserNotActive(reviewer_id));
            }
            if reviewer.team_name() != author.team_name() {
                warn!(
                    reviewer_id = %reviewer_id,
                    reviewer_team = %reviewer.team_name(),
                    author_team = %author.team_name(),
                    "reviewer not in author's team"
                );
                return Err(ReviewServiceError::ReviewerNotInTeam {
                    reviewer_id,
                    team_name: author.team_name().clone(),
                });
            }
            if reviewer.id() == author.id() {
                warn!(author_id = %author.id(), "attempt to assign author as reviewer");
                return Err(ReviewServiceError::AuthorAsReviewer(reviewer_id));
            }
            reviewers.push(reviewer_id);
        }
        Ok(reviewers)
    }

    async fn find_pull_request(&self, id: &PullRequestId) -> ReviewServiceResult<PullRequest> {
        self.pull_requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| ReviewServiceError::PullRequestNotFound(id.clone()))
    }

    async fn find_user(&self, id: &UserId) -> ReviewServiceResult<User> {
        self.directory
            .find_user(id)
            .await?
            .ok_or_else(|| ReviewServiceError::UserNotFound(id.clone()))
    }
}
