//! Users and team roster entries.

use super::{DirectoryDomainError, TeamName, UserId, ids::MAX_IDENTIFIER_LENGTH};
use serde::{Deserialize, Serialize};

/// A directory user. Every user belongs to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    id: UserId,
    username: String,
    team_name: TeamName,
    is_active: bool,
}

impl User {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyUsername`] or
    /// [`DirectoryDomainError::UsernameTooLong`] when the username is invalid.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        team_name: TeamName,
        is_active: bool,
    ) -> Result<Self, DirectoryDomainError> {
        let raw_name: String = username.into();
        let display_name = validate_username(&id, &raw_name)?;
        Ok(Self {
            id,
            username: display_name,
            team_name,
            is_active,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_name(&self) -> &TeamName {
        &self.team_name
    }

    /// Returns whether the user may be assigned reviews.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns a copy of the user with the activity flag replaced.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A roster entry supplied when creating or updating a team.
///
/// The team name is implied by the roster the member is listed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    id: UserId,
    username: String,
    is_active: bool,
}

impl TeamMember {
    /// Creates a roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError`] when the identifier or username is
    /// invalid.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        is_active: bool,
    ) -> Result<Self, DirectoryDomainError> {
        let user_id = UserId::new(id)?;
        let raw_name: String = username.into();
        let name = validate_username(&user_id, &raw_name)?;
        Ok(Self {
            id: user_id,
            username: name,
            is_active,
        })
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the member display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns whether the member is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    pub(super) fn into_user(self, team_name: TeamName) -> User {
        User {
            id: self.id,
            username: self.username,
            team_name,
            is_active: self.is_active,
        }
    }
}

fn validate_username(id: &UserId, username: &str) -> Result<String, DirectoryDomainError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(DirectoryDomainError::EmptyUsername(id.clone()));
    }
    if trimmed.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(DirectoryDomainError::UsernameTooLong(id.clone()));
    }
    Ok(trimmed.to_owned())
}
