//! Parallel requests against shared in-memory tables.

use crate::review_flows::helpers::{BACKEND, Stack};
use pr_reviewer::review::{
    domain::PullRequest,
    services::{CreatePullRequestRequest, ReassignReviewerRequest, ReviewServiceError},
};
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;

const AUTHORS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_creation_keeps_every_reviewer_set_valid() {
    let stack = Arc::new(Stack::seeded(99));
    stack.team("backend", BACKEND).await.expect("team setup");

    let mut tasks = JoinSet::new();
    for (index, author) in AUTHORS.iter().copied().cycle().take(40).enumerate() {
        let shared = Arc::clone(&stack);
        tasks.spawn(async move { shared.open(&format!("pr-{index}"), author).await });
    }
    let mut created: Vec<PullRequest> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        created.push(joined.expect("task join").expect("create"));
    }

    assert_eq!(created.len(), 40);
    for pull_request in &created {
        let reviewers: BTreeSet<&str> = pull_request
            .reviewers()
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(reviewers.len(), 2);
        assert!(!reviewers.contains(pull_request.author_id().as_str()));
        assert!(!reviewers.contains("erin"));
    }
    let stats = stack.reviews.stats().await.expect("stats");
    assert_eq!(stats.total_prs, 40);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_duplicate_creation_has_one_winner() {
    let stack = Arc::new(Stack::seeded(3));
    stack.team("backend", BACKEND).await.expect("team setup");

    let mut tasks = JoinSet::new();
    for author in AUTHORS {
        let shared = Arc::clone(&stack);
        tasks.spawn(async move {
            shared
                .reviews
                .create_pull_request(CreatePullRequestRequest::new("pr-race", "Race", author))
                .await
        });
    }
    let mut winners = 0_usize;
    let mut conflicts = 0_usize;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task join") {
            Ok(_) => winners += 1,
            Err(ReviewServiceError::PullRequestExists(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, AUTHORS.len() - 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_merges_agree_on_one_timestamp() {
    let stack = Arc::new(Stack::seeded(8));
    stack.team("backend", BACKEND).await.expect("team setup");
    stack.open("pr-1", "alice").await.expect("create");

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let shared = Arc::clone(&stack);
        tasks.spawn(async move { shared.reviews.merge_pull_request("pr-1").await });
    }
    let mut timestamps = BTreeSet::new();
    while let Some(joined) = tasks.join_next().await {
        let merged = joined.expect("task join").expect("merge");
        timestamps.insert(merged.merged_at().expect("merge timestamp"));
    }

    assert_eq!(timestamps.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reassignment_racing_a_merge_never_edits_a_merged_pull_request() {
    let stack = Arc::new(Stack::seeded(21));
    stack.team("backend", BACKEND).await.expect("team setup");
    let created = stack.open("pr-1", "alice").await.expect("create");
    let old = created
        .reviewers()
        .as_slice()
        .first()
        .cloned()
        .expect("reviewer assigned");

    let merger = Arc::clone(&stack);
    let merge = tokio::spawn(async move { merger.reviews.merge_pull_request("pr-1").await });
    let swapper = Arc::clone(&stack);
    let swap = tokio::spawn(async move {
        swapper
            .reviews
            .reassign_reviewer(ReassignReviewerRequest::new("pr-1", old.as_str()))
            .await
    });
    let merged = merge.await.expect("task join").expect("merge");
    let swapped = swap.await.expect("task join");

    let stored = stack.reviews.pull_request("pr-1").await.expect("lookup");
    assert!(stored.is_merged());
    assert_eq!(stored.merged_at(), merged.merged_at());
    match swapped {
        Ok(outcome) => assert_eq!(stored.reviewers(), outcome.pull_request.reviewers()),
        Err(err) => {
            assert!(matches!(err, ReviewServiceError::PullRequestMerged(_)));
            assert_eq!(stored.reviewers(), created.reviewers());
        }
    }
}
