//! Pull request adapter tests against `PostgreSQL`.

use crate::postgres_store::helpers::{TestDatabase, seed_backend, test_database};
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use pr_reviewer::directory::domain::UserId;
use pr_reviewer::review::{
    domain::{PullRequest, PullRequestId, PullRequestStatus},
    ports::{PullRequestRepository, PullRequestRepositoryError},
};
use rstest::rstest;

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

fn pr_id(id: &str) -> PullRequestId {
    PullRequestId::new(id).expect("valid pull request id")
}

fn pull_request(id: &str, author: &str, reviewers: &[&str]) -> PullRequest {
    PullRequest::new(
        pr_id(id),
        format!("Change {id}"),
        user(author),
        reviewers.iter().map(|reviewer| user(reviewer)),
        &DefaultClock,
    )
    .expect("valid pull request")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_pull_request_round_trips(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    let created = pull_request("pr-1", "alice", &["bob", "carol"]);

    repository.create(&created).await.expect("create");

    let found = repository
        .find_by_id(created.id())
        .await
        .expect("lookup")
        .expect("stored");
    assert_eq!(found.id(), created.id());
    assert_eq!(found.author_id(), created.author_id());
    assert_eq!(found.status(), PullRequestStatus::Open);
    assert_eq!(found.merged_at(), None);
    let mut reviewers = found.reviewers().as_slice().to_vec();
    reviewers.sort();
    assert_eq!(reviewers, vec![user("bob"), user("carol")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_identifier_is_rejected(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    repository
        .create(&pull_request("pr-1", "alice", &[]))
        .await
        .expect("create");

    let result = repository.create(&pull_request("pr-1", "bob", &["carol"])).await;

    assert!(matches!(
        result,
        Err(PullRequestRepositoryError::DuplicatePullRequest(_))
    ));
    assert!(repository.reviewers(&pr_id("pr-1")).await.expect("lookup").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_users_abort_the_whole_unit(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();

    let unknown_author = repository.create(&pull_request("pr-1", "ghost", &[])).await;
    let unknown_reviewer = repository
        .create(&pull_request("pr-2", "alice", &["bob", "ghost"]))
        .await;

    assert!(matches!(
        unknown_author,
        Err(PullRequestRepositoryError::UnknownUser(_))
    ));
    assert!(matches!(
        unknown_reviewer,
        Err(PullRequestRepositoryError::UnknownUser(_))
    ));
    assert_eq!(repository.count().await.expect("count"), 0);
    assert!(
        repository
            .find_by_reviewer(&user("bob"))
            .await
            .expect("lookup")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_sets_timestamp_once(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    repository
        .create(&pull_request("pr-1", "alice", &["bob"]))
        .await
        .expect("create");
    let first_time = Utc::now();

    let first = repository
        .merge(&pr_id("pr-1"), first_time)
        .await
        .expect("first merge");
    let second = repository
        .merge(&pr_id("pr-1"), first_time + Duration::hours(1))
        .await
        .expect("second merge");
    let missing = repository.merge(&pr_id("missing"), first_time).await;

    assert_eq!(first.status(), PullRequestStatus::Merged);
    assert_eq!(second.merged_at(), first.merged_at());
    assert!(matches!(missing, Err(PullRequestRepositoryError::NotFound(_))));
    assert_eq!(
        repository
            .count_by_status(PullRequestStatus::Merged)
            .await
            .expect("count"),
        1
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassign_swaps_rows_and_respects_merge(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    repository
        .create(&pull_request("pr-1", "alice", &["bob", "carol"]))
        .await
        .expect("create");

    repository
        .reassign_reviewer(&pr_id("pr-1"), &user("bob"), &user("dave"), Utc::now())
        .await
        .expect("reassign");
    let not_assigned = repository
        .reassign_reviewer(&pr_id("pr-1"), &user("bob"), &user("erin"), Utc::now())
        .await;
    repository
        .merge(&pr_id("pr-1"), Utc::now())
        .await
        .expect("merge");
    let after_merge = repository
        .reassign_reviewer(&pr_id("pr-1"), &user("dave"), &user("bob"), Utc::now())
        .await;

    assert!(matches!(
        not_assigned,
        Err(PullRequestRepositoryError::ReviewerNotAssigned { .. })
    ));
    assert!(matches!(
        after_merge,
        Err(PullRequestRepositoryError::AlreadyMerged(_))
    ));
    let mut reviewers = repository.reviewers(&pr_id("pr-1")).await.expect("lookup");
    reviewers.sort();
    assert_eq!(reviewers, vec![user("carol"), user("dave")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assign_fills_only_empty_reviewer_sets(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    repository
        .create(&pull_request("pr-1", "alice", &[]))
        .await
        .expect("create");

    repository
        .assign_reviewers(&pr_id("pr-1"), &[user("dave"), user("bob")], Utc::now())
        .await
        .expect("assign");
    let repeat = repository
        .assign_reviewers(&pr_id("pr-1"), &[user("carol")], Utc::now())
        .await;

    assert!(matches!(
        repeat,
        Err(PullRequestRepositoryError::ReviewersAlreadyAssigned(_))
    ));
    assert_eq!(
        repository.reviewers(&pr_id("pr-1")).await.expect("lookup"),
        vec![user("bob"), user("dave")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reviewer_listing_is_ordered_by_creation(#[from(test_database)] db: TestDatabase) {
    seed_backend(&db.directory()).await.expect("seed");
    let repository = db.pull_requests();
    for id in ["pr-1", "pr-2", "pr-3"] {
        repository
            .create(&pull_request(id, "alice", &["bob"]))
            .await
            .expect("create");
    }
    repository
        .merge(&pr_id("pr-2"), Utc::now())
        .await
        .expect("merge");

    let summaries = repository
        .find_by_reviewer(&user("bob"))
        .await
        .expect("lookup");

    let ids: Vec<&str> = summaries.iter().map(|summary| summary.id().as_str()).collect();
    assert_eq!(ids, vec!["pr-1", "pr-2", "pr-3"]);
    let merged = summaries.get(1).expect("second summary");
    assert_eq!(merged.status(), PullRequestStatus::Merged);
}
