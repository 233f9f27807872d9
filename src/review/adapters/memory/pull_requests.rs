//! In-memory pull request repository backed by the shared in-memory tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::directory::domain::UserId;
use crate::persistence::{
    lock_order,
    memory::{InMemoryDatabase, PullRequestRecord, Tables},
};
use crate::review::{
    domain::{
        MAX_REVIEWERS, PersistedPullRequestData, PullRequest, PullRequestId, PullRequestStatus,
        PullRequestSummary,
    },
    ports::{PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult},
};

/// Thread-safe in-memory pull request repository.
///
/// Author and reviewer references are checked against the users table of
/// the shared [`InMemoryDatabase`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPullRequestRepository {
    database: InMemoryDatabase,
}

impl InMemoryPullRequestRepository {
    /// Creates a repository over its own empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository over shared tables.
    #[must_use]
    pub const fn with_database(database: InMemoryDatabase) -> Self {
        Self { database }
    }
}

fn load(tables: &Tables, id: &PullRequestId) -> PullRequestRepositoryResult<Option<PullRequest>> {
    let Some(record) = tables.pull_requests.get(id) else {
        return Ok(None);
    };
    let data = PersistedPullRequestData {
        id: id.clone(),
        name: record.name.clone(),
        author_id: record.author_id.clone(),
        status: record.status,
        reviewers: tables.reviewers_of(id),
        created_at: record.created_at,
        merged_at: record.merged_at,
    };
    PullRequest::from_persisted(data)
        .map(Some)
        .map_err(PullRequestRepositoryError::invalid_persisted_data)
}

fn open_record<'tables>(
    tables: &'tables Tables,
    id: &PullRequestId,
) -> PullRequestRepositoryResult<&'tables PullRequestRecord> {
    let record = tables
        .pull_requests
        .get(id)
        .ok_or_else(|| PullRequestRepositoryError::NotFound(id.clone()))?;
    if record.status == PullRequestStatus::Merged {
        return Err(PullRequestRepositoryError::AlreadyMerged(id.clone()));
    }
    Ok(record)
}

fn insert_reviewer(
    tables: &mut Tables,
    id: &PullRequestId,
    reviewer: &UserId,
    assigned_at: DateTime<Utc>,
) -> PullRequestRepositoryResult<()> {
    if !tables.users.contains_key(reviewer) {
        return Err(PullRequestRepositoryError::UnknownUser(reviewer.to_string()));
    }
    let key = (id.clone(), reviewer.clone());
    if tables.reviewers.contains_key(&key) {
        return Err(PullRequestRepositoryError::ReviewerAlreadyAssigned {
            pull_request_id: id.clone(),
            reviewer_id: reviewer.clone(),
        });
    }
    tables.reviewers.insert(key, assigned_at);
    Ok(())
}

fn to_count(value: usize) -> PullRequestRepositoryResult<u64> {
    u64::try_from(value).map_err(PullRequestRepositoryError::persistence)
}

#[async_trait]
impl PullRequestRepository for InMemoryPullRequestRepository {
    async fn create(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()> {
        let id = pull_request.id();
        self.database.transact("create_pull_request", |tables| {
            if tables.pull_requests.contains_key(id) {
                return Err(PullRequestRepositoryError::DuplicatePullRequest(id.clone()));
            }
            if !tables.users.contains_key(pull_request.author_id()) {
                return Err(PullRequestRepositoryError::UnknownUser(
                    pull_request.author_id().to_string(),
                ));
            }
            tables.pull_requests.insert(
                id.clone(),
                PullRequestRecord {
                    name: pull_request.name().to_owned(),
                    author_id: pull_request.author_id().clone(),
                    status: pull_request.status(),
                    created_at: pull_request.created_at(),
                    merged_at: pull_request.merged_at(),
                },
            );
            for reviewer in lock_order(pull_request.reviewers()) {
                insert_reviewer(tables, id, reviewer, pull_request.created_at())?;
            }
            Ok(())
        })
    }

    async fn find_by_id(
        &self,
        id: &PullRequestId,
    ) -> PullRequestRepositoryResult<Option<PullRequest>> {
        load(&self.database.read(), id)
    }

    async fn merge(
        &self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<PullRequest> {
        self.database.transact("merge_pull_request", |tables| {
            let mut pull_request =
                load(tables, id)?.ok_or_else(|| PullRequestRepositoryError::NotFound(id.clone()))?;
            if pull_request.merge(merged_at) {
                let record = tables
                    .pull_requests
                    .get_mut(id)
                    .ok_or_else(|| PullRequestRepositoryError::NotFound(id.clone()))?;
                record.status = pull_request.status();
                record.merged_at = pull_request.merged_at();
            }
            Ok(pull_request)
        })
    }

    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()> {
        self.database.transact("reassign_reviewer", |tables| {
            open_record(tables, id)?;
            for reviewer in lock_order([old, new]) {
                if reviewer == old {
                    let removed = tables.reviewers.remove(&(id.clone(), old.clone()));
                    if removed.is_none() {
                        return Err(PullRequestRepositoryError::ReviewerNotAssigned {
                            pull_request_id: id.clone(),
                            reviewer_id: old.clone(),
                        });
                    }
                } else {
                    insert_reviewer(tables, id, reviewer, assigned_at)?;
                }
            }
            Ok(())
        })
    }

    async fn assign_reviewers(
        &self,
        id: &PullRequestId,
        reviewers: &[UserId],
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()> {
        self.database.transact("assign_reviewers", |tables| {
            open_record(tables, id)?;
            if !tables.reviewers_of(id).is_empty() {
                return Err(PullRequestRepositoryError::ReviewersAlreadyAssigned(id.clone()));
            }
            let ordered = lock_order(reviewers);
            if ordered.len() > MAX_REVIEWERS {
                return Err(PullRequestRepositoryError::ReviewerLimitExceeded(id.clone()));
            }
            for reviewer in ordered {
                insert_reviewer(tables, id, reviewer, assigned_at)?;
            }
            Ok(())
        })
    }

    async fn reviewers(&self, id: &PullRequestId) -> PullRequestRepositoryResult<Vec<UserId>> {
        Ok(self.database.read().reviewers_of(id))
    }

    async fn find_by_reviewer(
        &self,
        reviewer: &UserId,
    ) -> PullRequestRepositoryResult<Vec<PullRequestSummary>> {
        let tables = self.database.read();
        let mut summaries: Vec<(DateTime<Utc>, PullRequestSummary)> = tables
            .reviewers
            .keys()
            .filter(|(_, assigned)| assigned == reviewer)
            .filter_map(|(pull_request_id, _)| {
                tables.pull_requests.get(pull_request_id).map(|record| {
                    (
                        record.created_at,
                        PullRequestSummary::new(
                            pull_request_id.clone(),
                            record.name.clone(),
                            record.author_id.clone(),
                            record.status,
                        ),
                    )
                })
            })
            .collect();
        summaries.sort_by(|left, right| {
            left.0
                .cmp(&right.0)
                .then_with(|| left.1.id().cmp(right.1.id()))
        });
        Ok(summaries.into_iter().map(|(_, summary)| summary).collect())
    }

    async fn exists(&self, id: &PullRequestId) -> PullRequestRepositoryResult<bool> {
        Ok(self.database.read().pull_requests.contains_key(id))
    }

    async fn count(&self) -> PullRequestRepositoryResult<u64> {
        to_count(self.database.read().pull_requests.len())
    }

    async fn count_by_status(
        &self,
        status: PullRequestStatus,
    ) -> PullRequestRepositoryResult<u64> {
        let tables = self.database.read();
        to_count(
            tables
                .pull_requests
                .values()
                .filter(|record| record.status == status)
                .count(),
        )
    }
}
