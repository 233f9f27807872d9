//! Transaction deadline tests under lock contention.

use crate::postgres_store::helpers::{TestDatabase, seed_backend, test_database};
use chrono::Utc;
use diesel::connection::SimpleConnection;
use mockable::DefaultClock;
use pr_reviewer::directory::domain::UserId;
use pr_reviewer::review::{
    domain::{PullRequest, PullRequestId},
    ports::{PullRequestRepository, PullRequestRepositoryError},
};
use rstest::rstest;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_millis(200);

fn pr_id() -> PullRequestId {
    PullRequestId::new("pr-1").expect("valid pull request id")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_merge_times_out_and_leaves_row_unchanged(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    let created = PullRequest::new(
        pr_id(),
        "Locked change",
        UserId::new("alice").expect("valid user id"),
        [UserId::new("bob").expect("valid user id")],
        &DefaultClock,
    )
    .expect("valid pull request");
    repository.create(&created).await.expect("create");

    let mut holder = db.connect().expect("holder connection");
    holder
        .batch_execute("BEGIN; SELECT 1 FROM pull_requests WHERE pull_request_id = 'pr-1' FOR UPDATE;")
        .expect("hold row lock");

    let result = db
        .impatient_pull_requests(DEADLINE)
        .merge(&pr_id(), Utc::now())
        .await;

    holder.batch_execute("ROLLBACK;").expect("release row lock");
    assert!(matches!(
        result,
        Err(PullRequestRepositoryError::Timeout(deadline)) if deadline == DEADLINE
    ));
    let stored = repository
        .find_by_id(&pr_id())
        .await
        .expect("lookup")
        .expect("stored");
    assert!(!stored.is_merged());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_reassignment_times_out(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    let created = PullRequest::new(
        pr_id(),
        "Locked change",
        UserId::new("alice").expect("valid user id"),
        [UserId::new("bob").expect("valid user id")],
        &DefaultClock,
    )
    .expect("valid pull request");
    repository.create(&created).await.expect("create");

    let mut holder = db.connect().expect("holder connection");
    holder
        .batch_execute("BEGIN; SELECT 1 FROM pull_requests WHERE pull_request_id = 'pr-1' FOR UPDATE;")
        .expect("hold row lock");

    let result = db
        .impatient_pull_requests(DEADLINE)
        .reassign_reviewer(
            &pr_id(),
            &UserId::new("bob").expect("valid user id"),
            &UserId::new("carol").expect("valid user id"),
            Utc::now(),
        )
        .await;

    holder.batch_execute("ROLLBACK;").expect("release row lock");
    assert!(matches!(result, Err(PullRequestRepositoryError::Timeout(_))));
    let reviewers = repository.reviewers(&pr_id()).await.expect("lookup");
    assert_eq!(reviewers, vec![UserId::new("bob").expect("valid user id")]);
}
