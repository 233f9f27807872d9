//! `PostgreSQL` repository implementation for pull requests and reviewers.

use super::models::{NewPullRequestRow, NewReviewerRow, PullRequestRow};
use crate::directory::domain::UserId;
use crate::persistence::{
    TransactionBudget, lock_order,
    postgres::{DbFault, PgPool, PgTransaction, classify},
    schema::{pr_reviewers, pull_requests},
};
use crate::review::{
    domain::{
        MAX_REVIEWERS, PersistedPullRequestData, PullRequest, PullRequestId, PullRequestStatus,
        PullRequestSummary,
    },
    ports::{PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::time::Duration;

/// `PostgreSQL`-backed pull request repository.
#[derive(Debug, Clone)]
pub struct PostgresPullRequestRepository {
    pool: PgPool,
    budget: TransactionBudget,
}

impl PostgresPullRequestRepository {
    /// Creates a repository with the default transaction budget.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_budget(pool, TransactionBudget::default())
    }

    /// Creates a repository with an explicit transaction budget.
    #[must_use]
    pub const fn with_budget(pool: PgPool, budget: TransactionBudget) -> Self {
        Self { pool, budget }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PullRequestRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PullRequestRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(PullRequestRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PullRequestRepositoryError::persistence)?
    }
}

#[async_trait]
impl PullRequestRepository for PostgresPullRequestRepository {
    async fn create(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()> {
        let new_row = to_new_row(pull_request);
        let pull_request_id = pull_request.id().clone();
        let author_id = pull_request.author_id().clone();
        let reviewers: Vec<UserId> = lock_order(pull_request.reviewers().iter().cloned());
        let created_at = pull_request.created_at();
        let deadline = self.budget.standard();

        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit =
                PgTransaction::begin(connection, "create_pull_request", deadline).map_err(fail)?;

            diesel::insert_into(pull_requests::table)
                .values(&new_row)
                .execute(unit.connection())
                .map_err(|err| match classify(&err) {
                    DbFault::UniqueViolation(_) => {
                        PullRequestRepositoryError::DuplicatePullRequest(pull_request_id.clone())
                    }
                    DbFault::ForeignKeyViolation(_) => {
                        PullRequestRepositoryError::UnknownUser(author_id.to_string())
                    }
                    _ => map_unit_error(err, deadline),
                })?;

            for reviewer in &reviewers {
                insert_reviewer(
                    unit.connection(),
                    &pull_request_id,
                    reviewer,
                    created_at,
                    deadline,
                )?;
            }

            unit.commit().map_err(fail)
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: &PullRequestId,
    ) -> PullRequestRepositoryResult<Option<PullRequest>> {
        let lookup = id.clone();
        self.run_blocking(move |connection| {
            let row = pull_requests::table
                .find(lookup.as_str())
                .select(PullRequestRow::as_select())
                .first::<PullRequestRow>(connection)
                .optional()
                .map_err(PullRequestRepositoryError::persistence)?;
            let Some(found) = row else {
                return Ok(None);
            };
            let reviewer_ids = load_reviewer_ids(connection, &lookup)
                .map_err(PullRequestRepositoryError::persistence)?;
            row_to_pull_request(found, reviewer_ids).map(Some)
        })
        .await
    }

    async fn merge(
        &self,
        id: &PullRequestId,
        merged_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<PullRequest> {
        let target = id.clone();
        let deadline = self.budget.standard();
        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit =
                PgTransaction::begin(connection, "merge_pull_request", deadline).map_err(fail)?;

            let merged = diesel::update(
                pull_requests::table
                    .filter(pull_requests::pull_request_id.eq(target.as_str()))
                    .filter(pull_requests::status.eq(PullRequestStatus::Open.as_str())),
            )
            .set((
                pull_requests::status.eq(PullRequestStatus::Merged.as_str()),
                pull_requests::merged_at.eq(Some(merged_at)),
            ))
            .returning(PullRequestRow::as_returning())
            .get_result::<PullRequestRow>(unit.connection())
            .optional()
            .map_err(fail)?;

            let row = match merged {
                Some(updated) => updated,
                None => pull_requests::table
                    .find(target.as_str())
                    .select(PullRequestRow::as_select())
                    .first::<PullRequestRow>(unit.connection())
                    .optional()
                    .map_err(fail)?
                    .ok_or_else(|| PullRequestRepositoryError::NotFound(target.clone()))?,
            };
            let reviewer_ids = load_reviewer_ids(unit.connection(), &target).map_err(fail)?;
            unit.commit().map_err(fail)?;
            row_to_pull_request(row, reviewer_ids)
        })
        .await
    }

    async fn reassign_reviewer(
        &self,
        id: &PullRequestId,
        old: &UserId,
        new: &UserId,
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()> {
        let target = id.clone();
        let removed = old.clone();
        let added = new.clone();
        let deadline = self.budget.standard();
        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit =
                PgTransaction::begin(connection, "reassign_reviewer", deadline).map_err(fail)?;
            lock_open_pull_request(unit.connection(), &target, deadline)?;

            for reviewer in lock_order([&removed, &added]) {
                if reviewer == &removed {
                    let deleted = diesel::delete(
                        pr_reviewers::table
                            .filter(pr_reviewers::pull_request_id.eq(target.as_str()))
                            .filter(pr_reviewers::reviewer_id.eq(removed.as_str())),
                    )
                    .execute(unit.connection())
                    .map_err(fail)?;
                    if deleted == 0 {
                        return Err(PullRequestRepositoryError::ReviewerNotAssigned {
                            pull_request_id: target.clone(),
                            reviewer_id: removed.clone(),
                        });
                    }
                } else {
                    insert_reviewer(unit.connection(), &target, reviewer, assigned_at, deadline)?;
                }
            }

            unit.commit().map_err(fail)
        })
        .await
    }

    async fn assign_reviewers(
        &self,
        id: &PullRequestId,
        reviewers: &[UserId],
        assigned_at: DateTime<Utc>,
    ) -> PullRequestRepositoryResult<()> {
        let target = id.clone();
        let ordered: Vec<UserId> = lock_order(reviewers.iter().cloned());
        let deadline = self.budget.standard();
        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit =
                PgTransaction::begin(connection, "assign_reviewers", deadline).map_err(fail)?;
            lock_open_pull_request(unit.connection(), &target, deadline)?;

            let existing = pr_reviewers::table
                .filter(pr_reviewers::pull_request_id.eq(target.as_str()))
                .count()
                .get_result::<i64>(unit.connection())
                .map_err(fail)?;
            if existing > 0 {
                return Err(PullRequestRepositoryError::ReviewersAlreadyAssigned(target));
            }
            if ordered.len() > MAX_REVIEWERS {
                return Err(PullRequestRepositoryError::ReviewerLimitExceeded(target));
            }
            for reviewer in &ordered {
                insert_reviewer(unit.connection(), &target, reviewer, assigned_at, deadline)?;
            }

            unit.commit().map_err(fail)
        })
        .await
    }

    async fn reviewers(&self, id: &PullRequestId) -> PullRequestRepositoryResult<Vec<UserId>> {
        let lookup = id.clone();
        self.run_blocking(move |connection| {
            load_reviewer_ids(connection, &lookup)
                .map_err(PullRequestRepositoryError::persistence)?
                .into_iter()
                .map(|reviewer_id| {
                    UserId::new(reviewer_id)
                        .map_err(PullRequestRepositoryError::invalid_persisted_data)
                })
                .collect()
        })
        .await
    }

    async fn find_by_reviewer(
        &self,
        reviewer: &UserId,
    ) -> PullRequestRepositoryResult<Vec<PullRequestSummary>> {
        let lookup = reviewer.clone();
        self.run_blocking(move |connection| {
            pull_requests::table
                .inner_join(pr_reviewers::table)
                .filter(pr_reviewers::reviewer_id.eq(lookup.as_str()))
                .order((
                    pull_requests::created_at.asc(),
                    pull_requests::pull_request_id.asc(),
                ))
                .select(PullRequestRow::as_select())
                .load::<PullRequestRow>(connection)
                .map_err(PullRequestRepositoryError::persistence)?
                .into_iter()
                .map(row_to_summary)
                .collect()
        })
        .await
    }

    async fn exists(&self, id: &PullRequestId) -> PullRequestRepositoryResult<bool> {
        let lookup = id.clone();
        self.run_blocking(move |connection| {
            diesel::select(diesel::dsl::exists(
                pull_requests::table.filter(pull_requests::pull_request_id.eq(lookup.as_str())),
            ))
            .get_result::<bool>(connection)
            .map_err(PullRequestRepositoryError::persistence)
        })
        .await
    }

    async fn count(&self) -> PullRequestRepositoryResult<u64> {
        self.run_blocking(|connection| {
            let total = pull_requests::table
                .count()
                .get_result::<i64>(connection)
                .map_err(PullRequestRepositoryError::persistence)?;
            u64::try_from(total).map_err(PullRequestRepositoryError::persistence)
        })
        .await
    }

    async fn count_by_status(
        &self,
        status: PullRequestStatus,
    ) -> PullRequestRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let total = pull_requests::table
                .filter(pull_requests::status.eq(status.as_str()))
                .count()
                .get_result::<i64>(connection)
                .map_err(PullRequestRepositoryError::persistence)?;
            u64::try_from(total).map_err(PullRequestRepositoryError::persistence)
        })
        .await
    }
}

/// Locks the pull request row for the rest of the unit and checks it is open.
fn lock_open_pull_request(
    connection: &mut PgConnection,
    id: &PullRequestId,
    deadline: Duration,
) -> PullRequestRepositoryResult<()> {
    let status = pull_requests::table
        .find(id.as_str())
        .select(pull_requests::status)
        .for_update()
        .first::<String>(connection)
        .optional()
        .map_err(|err| map_unit_error(err, deadline))?
        .ok_or_else(|| PullRequestRepositoryError::NotFound(id.clone()))?;
    let parsed = PullRequestStatus::try_from(status.as_str())
        .map_err(PullRequestRepositoryError::invalid_persisted_data)?;
    if parsed == PullRequestStatus::Merged {
        return Err(PullRequestRepositoryError::AlreadyMerged(id.clone()));
    }
    Ok(())
}

fn insert_reviewer(
    connection: &mut PgConnection,
    id: &PullRequestId,
    reviewer: &UserId,
    assigned_at: DateTime<Utc>,
    deadline: Duration,
) -> PullRequestRepositoryResult<()> {
    diesel::insert_into(pr_reviewers::table)
        .values(NewReviewerRow {
            pull_request_id: id.as_str(),
            reviewer_id: reviewer.as_str(),
            assigned_at,
        })
        .execute(connection)
        .map_err(|err| match classify(&err) {
            DbFault::UniqueViolation(_) => PullRequestRepositoryError::ReviewerAlreadyAssigned {
                pull_request_id: id.clone(),
                reviewer_id: reviewer.clone(),
            },
            DbFault::ForeignKeyViolation(_) => {
                PullRequestRepositoryError::UnknownUser(reviewer.to_string())
            }
            _ => map_unit_error(err, deadline),
        })?;
    Ok(())
}

fn load_reviewer_ids(
    connection: &mut PgConnection,
    id: &PullRequestId,
) -> Result<Vec<String>, DieselError> {
    pr_reviewers::table
        .filter(pr_reviewers::pull_request_id.eq(id.as_str()))
        .order(pr_reviewers::reviewer_id.asc())
        .select(pr_reviewers::reviewer_id)
        .load::<String>(connection)
}

fn to_new_row(pull_request: &PullRequest) -> NewPullRequestRow {
    NewPullRequestRow {
        pull_request_id: pull_request.id().as_str().to_owned(),
        pull_request_name: pull_request.name().to_owned(),
        author_id: pull_request.author_id().as_str().to_owned(),
        status: pull_request.status().as_str().to_owned(),
        created_at: pull_request.created_at(),
        merged_at: pull_request.merged_at(),
    }
}

fn row_to_pull_request(
    row: PullRequestRow,
    reviewer_ids: Vec<String>,
) -> PullRequestRepositoryResult<PullRequest> {
    let PullRequestRow {
        pull_request_id,
        pull_request_name,
        author_id,
        status,
        created_at,
        merged_at,
    } = row;

    let reviewers = reviewer_ids
        .into_iter()
        .map(UserId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PullRequestRepositoryError::invalid_persisted_data)?;
    let data = PersistedPullRequestData {
        id: PullRequestId::new(pull_request_id)
            .map_err(PullRequestRepositoryError::invalid_persisted_data)?,
        name: pull_request_name,
        author_id: UserId::new(author_id)
            .map_err(PullRequestRepositoryError::invalid_persisted_data)?,
        status: PullRequestStatus::try_from(status.as_str())
            .map_err(PullRequestRepositoryError::invalid_persisted_data)?,
        reviewers,
        created_at,
        merged_at,
    };
    PullRequest::from_persisted(data).map_err(PullRequestRepositoryError::invalid_persisted_data)
}

fn row_to_summary(row: PullRequestRow) -> PullRequestRepositoryResult<PullRequestSummary> {
    let id = PullRequestId::new(row.pull_request_id)
        .map_err(PullRequestRepositoryError::invalid_persisted_data)?;
    let author_id =
        UserId::new(row.author_id).map_err(PullRequestRepositoryError::invalid_persisted_data)?;
    let status = PullRequestStatus::try_from(row.status.as_str())
        .map_err(PullRequestRepositoryError::invalid_persisted_data)?;
    Ok(PullRequestSummary::new(
        id,
        row.pull_request_name,
        author_id,
        status,
    ))
}

fn map_unit_error(err: DieselError, deadline: Duration) -> PullRequestRepositoryError {
    match classify(&err) {
        DbFault::Timeout => PullRequestRepositoryError::Timeout(deadline),
        _ => PullRequestRepositoryError::persistence(err),
    }
}
