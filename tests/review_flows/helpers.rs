//! Shared test helpers for end-to-end flows over the in-memory adapters.

use pr_reviewer::directory::{
    adapters::memory::InMemoryDirectory,
    services::{AddTeamRequest, TeamDirectoryService},
};
use pr_reviewer::persistence::memory::InMemoryDatabase;
use pr_reviewer::review::{
    adapters::memory::InMemoryPullRequestRepository,
    domain::PullRequest,
    services::{CreatePullRequestRequest, ReviewAssignmentService, ReviewerSelector},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Reviewer-assignment service over in-memory adapters.
pub type InMemoryReviewService =
    ReviewAssignmentService<InMemoryPullRequestRepository, InMemoryDirectory, DefaultClock>;

/// Boxed error type for fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Directory and review services sharing one set of in-memory tables.
pub struct Stack {
    /// Reviewer-assignment service.
    pub reviews: InMemoryReviewService,
    /// Team directory service.
    pub teams: TeamDirectoryService<InMemoryDirectory>,
}

impl Stack {
    /// Builds a stack whose reviewer selection is driven by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        let database = InMemoryDatabase::new();
        let directory = Arc::new(InMemoryDirectory::with_database(database.clone()));
        Self {
            reviews: ReviewAssignmentService::new(
                Arc::new(InMemoryPullRequestRepository::with_database(database)),
                Arc::clone(&directory),
                Arc::new(DefaultClock),
                Arc::new(ReviewerSelector::seeded(seed)),
            ),
            teams: TeamDirectoryService::new(directory),
        }
    }

    /// Creates or updates a team from `(user_id, is_active)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the team write fails.
    pub async fn team(&self, name: &str, members: &[(&str, bool)]) -> Result<(), BoxError> {
        let request = members
            .iter()
            .fold(AddTeamRequest::new(name), |request, (id, active)| {
                request.with_member(*id, id.to_uppercase(), *active)
            });
        self.teams.add_team(request).await?;
        Ok(())
    }

    /// Opens a pull request titled after its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn open(&self, id: &str, author: &str) -> Result<PullRequest, BoxError> {
        let created = self
            .reviews
            .create_pull_request(CreatePullRequestRequest::new(id, format!("Change {id}"), author))
            .await?;
        Ok(created)
    }
}

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a fresh stack for each test.
#[fixture]
pub fn stack() -> Stack {
    Stack::seeded(5)
}

/// Roster of the `backend` team used across tests.
pub const BACKEND: &[(&str, bool)] = &[
    ("alice", true),
    ("bob", true),
    ("carol", true),
    ("dave", true),
    ("erin", false),
];
