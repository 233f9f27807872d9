//! Repository port for teams and users.

use crate::directory::domain::{Team, TeamName, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for directory repository operations.
pub type DirectoryRepositoryResult<T> = Result<T, DirectoryRepositoryError>;

/// Team and user persistence contract.
///
/// Lookups return `None` or an empty collection when nothing matches. Team
/// writes are transactional units: either every member row is written or
/// none is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Creates a team and upserts all of its members in one unit.
    ///
    /// Members that already exist move to this team and take the supplied
    /// username and activity flag.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateTeam`] when the team
    /// already exists.
    async fn create_team_with_members(&self, team: &Team) -> DirectoryRepositoryResult<()>;

    /// Upserts the members of an existing team in one unit.
    ///
    /// Users already in the team but absent from the roster are left as they
    /// are.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::TeamNotFound`] when the team does
    /// not exist.
    async fn update_team_members(&self, team: &Team) -> DirectoryRepositoryResult<()>;

    /// Finds a team and all of its members, ordered by user identifier.
    async fn find_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Option<Team>>;

    /// Returns whether a team exists.
    async fn team_exists(&self, team_name: &TeamName) -> DirectoryRepositoryResult<bool>;

    /// Finds a user by identifier.
    async fn find_user(&self, user_id: &UserId) -> DirectoryRepositoryResult<Option<User>>;

    /// Returns every member of a team, ordered by user identifier.
    async fn users_by_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Vec<User>>;

    /// Returns the active members of a team, ordered by user identifier and
    /// omitting every user listed in `exclude`.
    async fn active_users_by_team(
        &self,
        team_name: &TeamName,
        exclude: &[UserId],
    ) -> DirectoryRepositoryResult<Vec<User>>;

    /// Sets a user's activity flag and returns the updated user, or `None`
    /// when the user does not exist.
    async fn set_user_active(
        &self,
        user_id: &UserId,
        is_active: bool,
    ) -> DirectoryRepositoryResult<Option<User>>;

    /// Marks every member of a team inactive and returns how many rows
    /// changed.
    async fn deactivate_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<u64>;

    /// Returns the number of teams.
    async fn count_teams(&self) -> DirectoryRepositoryResult<u64>;

    /// Returns the number of users.
    async fn count_users(&self) -> DirectoryRepositoryResult<u64>;

    /// Returns the number of active users.
    async fn count_active_users(&self) -> DirectoryRepositoryResult<u64>;
}

/// Errors returned by directory repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryRepositoryError {
    /// A team with the same name already exists.
    #[error("team already exists: {0}")]
    DuplicateTeam(TeamName),

    /// The team was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamName),

    /// The unit did not finish within its deadline and was rolled back.
    #[error("transaction exceeded its {0:?} deadline")]
    Timeout(Duration),

    /// Stored data could not be converted into domain values.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a conversion error raised while reading stored rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }
}
