//! In-memory directory repository backed by the shared in-memory tables.

use async_trait::async_trait;

use crate::directory::{
    domain::{Team, TeamName, User, UserId},
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};
use crate::persistence::memory::{InMemoryDatabase, Tables};

/// Thread-safe in-memory directory repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    database: InMemoryDatabase,
}

impl InMemoryDirectory {
    /// Creates a directory over its own empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory over shared tables.
    #[must_use]
    pub const fn with_database(database: InMemoryDatabase) -> Self {
        Self { database }
    }

    /// Returns the underlying tables handle.
    #[must_use]
    pub const fn database(&self) -> &InMemoryDatabase {
        &self.database
    }
}

fn upsert_members(tables: &mut Tables, team: &Team) {
    for member in team.members() {
        tables.users.insert(member.id().clone(), member.clone());
    }
}

fn members_of<'tables>(
    tables: &'tables Tables,
    team_name: &'tables TeamName,
) -> impl Iterator<Item = &'tables User> {
    tables
        .users
        .values()
        .filter(move |user| user.team_name() == team_name)
}

fn to_count(value: usize) -> DirectoryRepositoryResult<u64> {
    u64::try_from(value).map_err(DirectoryRepositoryError::persistence)
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectory {
    async fn create_team_with_members(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        self.database.transact("create_team_with_members", |tables| {
            if !tables.teams.insert(team.name().clone()) {
                return Err(DirectoryRepositoryError::DuplicateTeam(team.name().clone()));
            }
            upsert_members(tables, team);
            Ok(())
        })
    }

    async fn update_team_members(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        self.database.transact("update_team_members", |tables| {
            if !tables.teams.contains(team.name()) {
                return Err(DirectoryRepositoryError::TeamNotFound(team.name().clone()));
            }
            upsert_members(tables, team);
            Ok(())
        })
    }

    async fn find_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Option<Team>> {
        let tables = self.database.read();
        if !tables.teams.contains(team_name) {
            return Ok(None);
        }
        let members = members_of(&tables, team_name).cloned().collect();
        Ok(Some(Team::from_persisted(team_name.clone(), members)))
    }

    async fn team_exists(&self, team_name: &TeamName) -> DirectoryRepositoryResult<bool> {
        Ok(self.database.read().teams.contains(team_name))
    }

    async fn find_user(&self, user_id: &UserId) -> DirectoryRepositoryResult<Option<User>> {
        Ok(self.database.read().users.get(user_id).cloned())
    }

    async fn users_by_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Vec<User>> {
        let tables = self.database.read();
        Ok(members_of(&tables, team_name).cloned().collect())
    }

    async fn active_users_by_team(
        &self,
        team_name: &TeamName,
        exclude: &[UserId],
    ) -> DirectoryRepositoryResult<Vec<User>> {
        let tables = self.database.read();
        Ok(members_of(&tables, team_name)
            .filter(|user| user.is_active() && !exclude.contains(user.id()))
            .cloned()
            .collect())
    }

    async fn set_user_active(
        &self,
        user_id: &UserId,
        is_active: bool,
    ) -> DirectoryRepositoryResult<Option<User>> {
        self.database.transact("set_user_active", |tables| {
            let Some(user) = tables.users.get_mut(user_id) else {
                return Ok(None);
            };
            *user = user.clone().with_active(is_active);
            Ok(Some(user.clone()))
        })
    }

    async fn deactivate_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<u64> {
        self.database.transact("deactivate_team", |tables| {
            let mut changed = 0_usize;
            for user in tables.users.values_mut() {
                if user.team_name() == team_name && user.is_active() {
                    *user = user.clone().with_active(false);
                    changed += 1;
                }
            }
            to_count(changed)
        })
    }

    async fn count_teams(&self) -> DirectoryRepositoryResult<u64> {
        to_count(self.database.read().teams.len())
    }

    async fn count_users(&self) -> DirectoryRepositoryResult<u64> {
        to_count(self.database.read().users.len())
    }

    async fn count_active_users(&self) -> DirectoryRepositoryResult<u64> {
        let tables = self.database.read();
        to_count(tables.users.values().filter(|user| user.is_active()).count())
    }
}
