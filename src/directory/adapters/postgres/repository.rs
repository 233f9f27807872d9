//! `PostgreSQL` repository implementation for teams and users.

use super::models::UserRow;
use crate::directory::{
    domain::{Team, TeamName, User, UserId},
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};
use crate::persistence::{
    TransactionBudget, lock_order_by,
    postgres::{DbFault, PgPool, PgTransaction, classify},
    schema::{teams, users},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use std::time::Duration;

/// `PostgreSQL`-backed directory repository.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: PgPool,
    budget: TransactionBudget,
}

impl PostgresDirectory {
    /// Creates a repository with the default transaction budget.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_budget(pool, TransactionBudget::default())
    }

    /// Creates a repository with an explicit transaction budget.
    #[must_use]
    pub const fn with_budget(pool: PgPool, budget: TransactionBudget) -> Self {
        Self { pool, budget }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DirectoryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DirectoryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(DirectoryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DirectoryRepositoryError::persistence)?
    }

    async fn write_team(&self, team: &Team, mode: TeamWrite) -> DirectoryRepositoryResult<()> {
        let team_name = team.name().clone();
        let rows = lock_order_by(team.members().iter().map(to_row), |row| row.user_id.clone());
        let deadline = self.budget.bulk();

        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit =
                PgTransaction::begin(connection, mode.label(), deadline).map_err(fail)?;

            match mode {
                TeamWrite::Create => {
                    diesel::insert_into(teams::table)
                        .values(teams::team_name.eq(team_name.as_str()))
                        .execute(unit.connection())
                        .map_err(|err| match classify(&err) {
                            DbFault::UniqueViolation(_) => {
                                DirectoryRepositoryError::DuplicateTeam(team_name.clone())
                            }
                            _ => map_unit_error(err, deadline),
                        })?;
                }
                TeamWrite::Update => {
                    let existing = teams::table
                        .find(team_name.as_str())
                        .select(teams::team_name)
                        .for_update()
                        .first::<String>(unit.connection())
                        .optional()
                        .map_err(fail)?;
                    if existing.is_none() {
                        return Err(DirectoryRepositoryError::TeamNotFound(team_name));
                    }
                }
            }

            for row in &rows {
                diesel::insert_into(users::table)
                    .values(row)
                    .on_conflict(users::user_id)
                    .do_update()
                    .set((
                        users::username.eq(excluded(users::username)),
                        users::team_name.eq(excluded(users::team_name)),
                        users::is_active.eq(excluded(users::is_active)),
                    ))
                    .execute(unit.connection())
                    .map_err(fail)?;
            }

            unit.commit().map_err(fail)
        })
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum TeamWrite {
    Create,
    Update,
}

impl TeamWrite {
    const fn label(self) -> &'static str {
        match self {
            Self::Create => "create_team_with_members",
            Self::Update => "update_team_members",
        }
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectory {
    async fn create_team_with_members(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        self.write_team(team, TeamWrite::Create).await
    }

    async fn update_team_members(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        self.write_team(team, TeamWrite::Update).await
    }

    async fn find_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Option<Team>> {
        let lookup = team_name.clone();
        self.run_blocking(move |connection| {
            let exists = team_row_exists(connection, &lookup)?;
            if !exists {
                return Ok(None);
            }
            let members = load_team_users(connection, &lookup, None)?;
            Ok(Some(Team::from_persisted(lookup, members)))
        })
        .await
    }

    async fn team_exists(&self, team_name: &TeamName) -> DirectoryRepositoryResult<bool> {
        let lookup = team_name.clone();
        self.run_blocking(move |connection| team_row_exists(connection, &lookup))
            .await
    }

    async fn find_user(&self, user_id: &UserId) -> DirectoryRepositoryResult<Option<User>> {
        let lookup = user_id.clone();
        self.run_blocking(move |connection| {
            let row = users::table
                .find(lookup.as_str())
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn users_by_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<Vec<User>> {
        let lookup = team_name.clone();
        self.run_blocking(move |connection| load_team_users(connection, &lookup, None))
            .await
    }

    async fn active_users_by_team(
        &self,
        team_name: &TeamName,
        exclude: &[UserId],
    ) -> DirectoryRepositoryResult<Vec<User>> {
        let lookup = team_name.clone();
        let excluded_ids: Vec<String> = exclude.iter().map(|id| id.as_str().to_owned()).collect();
        self.run_blocking(move |connection| {
            load_team_users(connection, &lookup, Some(&excluded_ids))
        })
        .await
    }

    async fn set_user_active(
        &self,
        user_id: &UserId,
        is_active: bool,
    ) -> DirectoryRepositoryResult<Option<User>> {
        let target = user_id.clone();
        self.run_blocking(move |connection| {
            let row = diesel::update(users::table.find(target.as_str()))
                .set(users::is_active.eq(is_active))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn deactivate_team(&self, team_name: &TeamName) -> DirectoryRepositoryResult<u64> {
        let target = team_name.clone();
        let deadline = self.budget.bulk();
        self.run_blocking(move |connection| {
            let fail = |err| map_unit_error(err, deadline);
            let mut unit = PgTransaction::begin(connection, "deactivate_team", deadline)
                .map_err(fail)?;
            let changed = diesel::update(
                users::table
                    .filter(users::team_name.eq(target.as_str()))
                    .filter(users::is_active.eq(true)),
            )
            .set(users::is_active.eq(false))
            .execute(unit.connection())
            .map_err(fail)?;
            unit.commit().map_err(fail)?;
            to_count(changed)
        })
        .await
    }

    async fn count_teams(&self) -> DirectoryRepositoryResult<u64> {
        self.run_blocking(|connection| {
            let total = teams::table
                .count()
                .get_result::<i64>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            to_count_i64(total)
        })
        .await
    }

    async fn count_users(&self) -> DirectoryRepositoryResult<u64> {
        self.run_blocking(|connection| {
            let total = users::table
                .count()
                .get_result::<i64>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            to_count_i64(total)
        })
        .await
    }

    async fn count_active_users(&self) -> DirectoryRepositoryResult<u64> {
        self.run_blocking(|connection| {
            let total = users::table
                .filter(users::is_active.eq(true))
                .count()
                .get_result::<i64>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            to_count_i64(total)
        })
        .await
    }
}

fn team_row_exists(
    connection: &mut PgConnection,
    team_name: &TeamName,
) -> DirectoryRepositoryResult<bool> {
    diesel::select(diesel::dsl::exists(
        teams::table.filter(teams::team_name.eq(team_name.as_str())),
    ))
    .get_result::<bool>(connection)
    .map_err(DirectoryRepositoryError::persistence)
}

fn load_team_users(
    connection: &mut PgConnection,
    team_name: &TeamName,
    active_excluding: Option<&[String]>,
) -> DirectoryRepositoryResult<Vec<User>> {
    let mut query = users::table
        .filter(users::team_name.eq(team_name.as_str()))
        .select(UserRow::as_select())
        .order(users::user_id.asc())
        .into_boxed();
    if let Some(excluded_ids) = active_excluding {
        query = query
            .filter(users::is_active.eq(true))
            .filter(users::user_id.ne_all(excluded_ids.to_vec()));
    }
    query
        .load::<UserRow>(connection)
        .map_err(DirectoryRepositoryError::persistence)?
        .into_iter()
        .map(row_to_user)
        .collect()
}

fn to_row(user: &User) -> UserRow {
    UserRow {
        user_id: user.id().as_str().to_owned(),
        username: user.username().to_owned(),
        team_name: user.team_name().as_str().to_owned(),
        is_active: user.is_active(),
    }
}

fn row_to_user(row: UserRow) -> DirectoryRepositoryResult<User> {
    let UserRow {
        user_id,
        username,
        team_name,
        is_active,
    } = row;
    let id = UserId::new(user_id).map_err(DirectoryRepositoryError::invalid_persisted_data)?;
    let team = TeamName::new(team_name).map_err(DirectoryRepositoryError::invalid_persisted_data)?;
    User::new(id, username, team, is_active)
        .map_err(DirectoryRepositoryError::invalid_persisted_data)
}

fn map_unit_error(err: DieselError, deadline: Duration) -> DirectoryRepositoryError {
    match classify(&err) {
        DbFault::Timeout => DirectoryRepositoryError::Timeout(deadline),
        _ => DirectoryRepositoryError::persistence(err),
    }
}

fn to_count(value: usize) -> DirectoryRepositoryResult<u64> {
    u64::try_from(value).map_err(DirectoryRepositoryError::persistence)
}

fn to_count_i64(value: i64) -> DirectoryRepositoryResult<u64> {
    u64::try_from(value).map_err(DirectoryRepositoryError::persistence)
}
