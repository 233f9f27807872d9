//! Team directory orchestration.
//!
//! Provides [`TeamDirectoryService`] which creates or updates teams, toggles
//! user activity, and deactivates whole teams.

use crate::directory::{
    domain::{DirectoryDomainError, Team, TeamMember, TeamName, User, UserId},
    ports::{DirectoryRepository, DirectoryRepositoryError},
};
use crate::error_code::ErrorCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for creating or updating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTeamRequest {
    team_name: String,
    members: Vec<(String, String, bool)>,
}

impl AddTeamRequest {
    /// Creates a request for the named team with an empty roster.
    #[must_use]
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a roster entry.
    #[must_use]
    pub fn with_member(
        mut self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        is_active: bool,
    ) -> Self {
        self.members
            .push((user_id.into(), username.into(), is_active));
        self
    }
}

/// Outcome of deactivating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDeactivation {
    /// The team after deactivation.
    pub team: Team,
    /// How many members changed from active to inactive.
    pub deactivated: u64,
}

/// Service-level errors for directory operations.
#[derive(Debug, Error)]
pub enum DirectoryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DirectoryDomainError),
    /// The team does not exist.
    #[error("team not found: {0}")]
    TeamNotFound(TeamName),
    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DirectoryRepositoryError),
}

impl DirectoryServiceError {
    /// Returns the caller-facing error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Domain(_) => ErrorCode::BadRequest,
            Self::TeamNotFound(_)
            | Self::UserNotFound(_)
            | Self::Repository(DirectoryRepositoryError::TeamNotFound(_)) => ErrorCode::NotFound,
            Self::Repository(_) => ErrorCode::Internal,
        }
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// Result type for directory service operations.
pub type DirectoryServiceResult<T> = Result<T, DirectoryServiceError>;

/// Team and user management service.
#[derive(Clone)]
pub struct TeamDirectoryService<D>
where
    D: DirectoryRepository,
{
    directory: Arc<D>,
}

impl<D> TeamDirectoryService<D>
where
    D: DirectoryRepository,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Creates the team, or updates its members when it already exists.
    ///
    /// Returns the team as stored after the write.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Domain`] when the name or a roster
    /// entry is invalid, or [`DirectoryServiceError::Repository`] when the
    /// write fails.
    pub async fn add_team(&self, request: AddTeamRequest) -> DirectoryServiceResult<Team> {
        let AddTeamRequest { team_name, members } = request;
        let name = TeamName::new(team_name)?;
        let roster = members
            .into_iter()
            .map(|(user_id, username, is_active)| TeamMember::new(user_id, username, is_active))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| warn!(team_name = %name, error = %err, "invalid team member"))?;
        let team = Team::new(name.clone(), roster)?;

        info!(team_name = %name, members_count = team.members().len(), "adding team");
        if self.directory.team_exists(&name).await? {
            self.directory.update_team_members(&team).await?;
            info!(team_name = %name, "team members updated");
        } else {
            match self.directory.create_team_with_members(&team).await {
                Ok(()) => info!(team_name = %name, "team created with members"),
                Err(DirectoryRepositoryError::DuplicateTeam(_)) => {
                    // Lost a creation race; the roster still applies.
                    self.directory.update_team_members(&team).await?;
                    info!(team_name = %name, "team members updated");
                }
                Err(err) => return Err(err.into()),
            }
        }

        self.get_existing_team(&name).await
    }

    /// Returns a team and its members.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::TeamNotFound`] when the team does not
    /// exist.
    pub async fn get_team(&self, team_name: &str) -> DirectoryServiceResult<Team> {
        let name = TeamName::new(team_name)?;
        self.get_existing_team(&name).await
    }

    /// Marks every member of a team inactive.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::TeamNotFound`] when the team does not
    /// exist.
    pub async fn deactivate_team(&self, team_name: &str) -> DirectoryServiceResult<TeamDeactivation> {
        let name = TeamName::new(team_name)?;
        if !self.directory.team_exists(&name).await? {
            return Err(DirectoryServiceError::TeamNotFound(name));
        }
        let deactivated = self.directory.deactivate_team(&name).await?;
        let team = self.get_existing_team(&name).await?;
        info!(team_name = %name, deactivated_count = deactivated, "team deactivated");
        Ok(TeamDeactivation { team, deactivated })
    }

    /// Sets a user's activity flag and returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::UserNotFound`] when the user does not
    /// exist.
    pub async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> DirectoryServiceResult<User> {
        let id = UserId::new(user_id)?;
        info!(user_id = %id, is_active, "setting user active status");
        self.directory
            .set_user_active(&id, is_active)
            .await?
            .ok_or(DirectoryServiceError::UserNotFound(id))
    }

    /// Returns a user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::UserNotFound`] when the user does not
    /// exist.
    pub async fn get_user(&self, user_id: &str) -> DirectoryServiceResult<User> {
        let id = UserId::new(user_id)?;
        self.directory
            .find_user(&id)
            .await?
            .ok_or(DirectoryServiceError::UserNotFound(id))
    }

    async fn get_existing_team(&self, name: &TeamName) -> DirectoryServiceResult<Team> {
        self.directory
            .find_team(name)
            .await?
            .ok_or_else(|| DirectoryServiceError::TeamNotFound(name.clone()))
    }
}
