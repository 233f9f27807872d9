//! Team aggregate.

use super::{DirectoryDomainError, TeamMember, TeamName, User};
use serde::Serialize;
use std::collections::BTreeSet;

/// A named group of users. Reviewer candidates are drawn from teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    team_name: TeamName,
    members: Vec<User>,
}

impl Team {
    /// Creates a team from a roster, assigning every member to the team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::DuplicateMember`] when the roster lists
    /// a user more than once.
    pub fn new(
        team_name: TeamName,
        roster: impl IntoIterator<Item = TeamMember>,
    ) -> Result<Self, DirectoryDomainError> {
        let mut seen = BTreeSet::new();
        let mut members = Vec::new();
        for member in roster {
            if !seen.insert(member.id().clone()) {
                return Err(DirectoryDomainError::DuplicateMember(member.id().clone()));
            }
            members.push(member.into_user(team_name.clone()));
        }
        Ok(Self { team_name, members })
    }

    /// Reconstructs a team from stored users.
    #[must_use]
    pub const fn from_persisted(team_name: TeamName, members: Vec<User>) -> Self {
        Self { team_name, members }
    }

    /// Returns the team name.
    #[must_use]
    pub const fn name(&self) -> &TeamName {
        &self.team_name
    }

    /// Returns all members.
    #[must_use]
    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// Returns the members that may be assigned reviews.
    pub fn active_members(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|member| member.is_active())
    }
}
