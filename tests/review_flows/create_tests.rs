//! Pull request creation flows.

use crate::review_flows::helpers::{BACKEND, Stack, runtime, stack};
use pr_reviewer::error_code::ErrorCode;
use pr_reviewer::review::{domain::PullRequestStatus, services::CreatePullRequestRequest};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
fn created_pull_request_is_open_with_two_active_teammates(
    runtime: io::Result<Runtime>,
    stack: Stack,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("backend", BACKEND)).expect("team setup");

    let created = rt.block_on(stack.open("pr-1", "alice")).expect("create");

    assert_eq!(created.status(), PullRequestStatus::Open);
    assert_eq!(created.merged_at(), None);
    assert_eq!(created.reviewers().len(), 2);
    for reviewer in created.reviewers() {
        assert!(["bob", "carol", "dave"].contains(&reviewer.as_str()));
    }
    let stored = rt
        .block_on(stack.reviews.pull_request("pr-1"))
        .expect("lookup");
    assert_eq!(stored, created);
}

#[rstest]
fn reviewers_come_only_from_the_authors_team(runtime: io::Result<Runtime>, stack: Stack) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("backend", &[("alice", true), ("bob", true)]))
        .expect("team setup");
    rt.block_on(stack.team("frontend", &[("frank", true), ("grace", true)]))
        .expect("team setup");

    let created = rt.block_on(stack.open("pr-1", "alice")).expect("create");

    assert_eq!(created.reviewers().len(), 1);
    assert!(created.reviewers().iter().all(|id| id.as_str() == "bob"));
}

#[rstest]
fn lone_author_opens_pull_request_without_reviewers(runtime: io::Result<Runtime>, stack: Stack) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("solo", &[("alice", true), ("idle", false)]))
        .expect("team setup");

    let created = rt.block_on(stack.open("pr-1", "alice")).expect("create");

    assert!(created.reviewers().is_empty());
}

#[rstest]
fn inactive_author_may_still_open_pull_requests(runtime: io::Result<Runtime>, stack: Stack) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("backend", &[("alice", false), ("bob", true)]))
        .expect("team setup");

    let created = rt.block_on(stack.open("pr-1", "alice")).expect("create");

    assert_eq!(created.reviewers().len(), 1);
}

#[rstest]
#[case("", "Title", "alice", ErrorCode::BadRequest)]
#[case("pr-1", "  ", "alice", ErrorCode::BadRequest)]
#[case("pr-1", "Title", "", ErrorCode::BadRequest)]
#[case("pr-1", "Title", "nobody", ErrorCode::NotFound)]
#[case("pr-existing", "Title", "nobody", ErrorCode::PrExists)]
fn creation_failures_map_to_error_codes(
    runtime: io::Result<Runtime>,
    stack: Stack,
    #[case] id: &str,
    #[case] name: &str,
    #[case] author: &str,
    #[case] expected: ErrorCode,
) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("backend", BACKEND)).expect("team setup");
    rt.block_on(stack.open("pr-existing", "alice")).expect("create");

    let result = rt.block_on(
        stack
            .reviews
            .create_pull_request(CreatePullRequestRequest::new(id, name, author)),
    );

    let err = result.expect_err("creation should fail");
    assert_eq!(err.code(), expected);
    let stats = rt.block_on(stack.reviews.stats()).expect("stats");
    assert_eq!(stats.total_prs, 1);
}

#[rstest]
fn created_pull_request_appears_in_reviewer_listings(runtime: io::Result<Runtime>, stack: Stack) {
    let rt = runtime.expect("runtime creation");
    rt.block_on(stack.team("backend", BACKEND)).expect("team setup");
    let created = rt.block_on(stack.open("pr-1", "alice")).expect("create");

    for reviewer in created.reviewers() {
        let listed = rt
            .block_on(stack.reviews.pull_requests_for_reviewer(reviewer.as_str()))
            .expect("listing");
        assert_eq!(listed.len(), 1);
        let summary = listed.first().expect("one summary");
        assert_eq!(summary.id(), created.id());
        assert_eq!(summary.author_id().as_str(), "alice");
    }
    let author_reviews = rt
        .block_on(stack.reviews.pull_requests_for_reviewer("alice"))
        .expect("listing");
    assert!(author_reviews.is_empty());
}
