//! Directory adapter tests against `PostgreSQL`.

use crate::postgres_store::helpers::{TestDatabase, seed_backend, team, test_database};
use pr_reviewer::directory::{
    domain::{TeamName, UserId},
    ports::{DirectoryRepository, DirectoryRepositoryError},
};
use rstest::rstest;

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

fn name(value: &str) -> TeamName {
    TeamName::new(value).expect("valid team name")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_round_trips_with_members(#[from(test_database)] db: TestDatabase) {
    let directory = db.directory();

    seed_backend(&directory).await.expect("seed");

    let found = directory
        .find_team(&name("backend"))
        .await
        .expect("lookup")
        .expect("team stored");
    assert_eq!(found.members().len(), 5);
    assert_eq!(found.active_members().count(), 4);
    assert!(directory.team_exists(&name("backend")).await.expect("exists"));
    assert!(!directory.team_exists(&name("ghosts")).await.expect("exists"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_team_is_rejected_without_partial_writes(
    #[from(test_database)] db: TestDatabase,
) {
    let directory = db.directory();
    seed_backend(&directory).await.expect("seed");

    let result = directory
        .create_team_with_members(&team("backend", &[("zed", true)]))
        .await;

    assert!(matches!(result, Err(DirectoryRepositoryError::DuplicateTeam(_))));
    assert_eq!(directory.find_user(&user("zed")).await.expect("lookup"), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_missing_team_is_not_found(#[from(test_database)] db: TestDatabase) {
    let directory = db.directory();

    let result = directory
        .update_team_members(&team("ghosts", &[("casper", true)]))
        .await;

    assert!(matches!(result, Err(DirectoryRepositoryError::TeamNotFound(_))));
    assert_eq!(directory.count_users().await.expect("count"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_moves_users_between_teams(#[from(test_database)] db: TestDatabase) {
    let directory = db.directory();
    seed_backend(&directory).await.expect("seed");

    directory
        .create_team_with_members(&team("frontend", &[("bob", false), ("frank", true)]))
        .await
        .expect("create frontend");

    let bob = directory
        .find_user(&user("bob"))
        .await
        .expect("lookup")
        .expect("bob stored");
    assert_eq!(bob.team_name().as_str(), "frontend");
    assert!(!bob.is_active());
    let backend = directory
        .users_by_team(&name("backend"))
        .await
        .expect("lookup");
    assert_eq!(backend.len(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn candidate_query_filters_inactive_and_excluded_users(
    #[from(test_database)] db: TestDatabase,
) {
    let directory = db.directory();
    seed_backend(&directory).await.expect("seed");

    let candidates = directory
        .active_users_by_team(&name("backend"), &[user("alice"), user("carol")])
        .await
        .expect("lookup");

    let mut ids: Vec<&str> = candidates.iter().map(|member| member.id().as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["bob", "dave"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activity_changes_are_persisted(#[from(test_database)] db: TestDatabase) {
    let directory = db.directory();
    seed_backend(&directory).await.expect("seed");

    let updated = directory
        .set_user_active(&user("erin"), true)
        .await
        .expect("update");
    let missing = directory
        .set_user_active(&user("nobody"), true)
        .await
        .expect("update");
    let deactivated = directory
        .deactivate_team(&name("backend"))
        .await
        .expect("deactivate");

    assert!(updated.is_some_and(|member| member.is_active()));
    assert_eq!(missing, None);
    assert_eq!(deactivated, 5);
    assert_eq!(directory.count_active_users().await.expect("count"), 0);
    assert_eq!(directory.count_teams().await.expect("count"), 1);
}
