//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use pr_reviewer::directory::{
    adapters::postgres::PostgresDirectory,
    domain::{Team, TeamMember, TeamName},
    ports::DirectoryRepository,
};
use pr_reviewer::persistence::{
    TransactionBudget,
    postgres::{PgPool, apply_schema},
};
use pr_reviewer::review::adapters::postgres::PostgresPullRequestRepository;
use rstest::fixture;
use std::env;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

/// Environment variable naming the test server.
pub const DATABASE_URL_VAR: &str = "PR_REVIEWER_TEST_DATABASE_URL";

/// Boxed error type for fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Points every pooled connection at the test schema.
#[derive(Debug)]
struct SearchPath {
    schema: String,
}

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", self.schema))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// A throwaway schema with the reviewer tables applied.
///
/// The schema is dropped with the value.
pub struct TestDatabase {
    url: String,
    schema: String,
    pool: PgPool,
}

impl TestDatabase {
    /// Creates a fresh schema on the server at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema or pool cannot be set up.
    pub fn create(url: &str) -> Result<Self, BoxError> {
        let schema = format!("pr_test_{}", Uuid::new_v4().simple());
        let mut admin = PgConnection::establish(url)?;
        admin.batch_execute(&format!(
            "CREATE SCHEMA {schema}; SET search_path TO {schema};"
        ))?;
        apply_schema(&mut admin)?;

        let pool = Pool::builder()
            .max_size(8)
            .connection_customizer(Box::new(SearchPath {
                schema: schema.clone(),
            }))
            .build(ConnectionManager::<PgConnection>::new(url))?;
        Ok(Self {
            url: url.to_owned(),
            schema,
            pool,
        })
    }

    /// Returns a pool bound to the test schema.
    #[must_use]
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Opens a connection outside the pool, bound to the test schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub fn connect(&self) -> Result<PgConnection, BoxError> {
        let mut conn = PgConnection::establish(&self.url)?;
        conn.batch_execute(&format!("SET search_path TO {}", self.schema))?;
        Ok(conn)
    }

    /// Builds a directory adapter over the test schema.
    #[must_use]
    pub fn directory(&self) -> PostgresDirectory {
        PostgresDirectory::new(self.pool())
    }

    /// Builds a pull request adapter over the test schema.
    #[must_use]
    pub fn pull_requests(&self) -> PostgresPullRequestRepository {
        PostgresPullRequestRepository::new(self.pool())
    }

    /// Builds a pull request adapter with a short deadline.
    #[must_use]
    pub fn impatient_pull_requests(&self, deadline: Duration) -> PostgresPullRequestRepository {
        PostgresPullRequestRepository::with_budget(
            self.pool(),
            TransactionBudget::new(deadline, deadline),
        )
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.url) {
            let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema);
            if let Err(err) = conn.batch_execute(&sql) {
                tracing::warn!(schema = %self.schema, error = %err, "test schema not dropped");
            }
        }
    }
}

/// Resolves the server the tests run against.
///
/// `PR_REVIEWER_TEST_DATABASE_URL` overrides the shared embedded cluster,
/// which is started on first use.
///
/// # Panics
///
/// Panics if the embedded cluster fails to start.
#[must_use]
pub fn server_url() -> String {
    if let Ok(url) = env::var(DATABASE_URL_VAR) {
        return url;
    }
    // Cluster start-up drives its own runtime, so keep it off the test's.
    thread::spawn(|| {
        let cluster: &'static TestCluster = shared_test_cluster();
        cluster.connection().database_url("postgres")
    })
    .join()
    .expect("embedded cluster start-up")
}

/// Provides a fresh test schema on the resolved server.
///
/// # Panics
///
/// Panics if the server cannot be reached or the schema cannot be created.
#[fixture]
pub fn test_database() -> TestDatabase {
    TestDatabase::create(&server_url()).expect("test schema setup")
}

/// Builds a team from `(user_id, is_active)` pairs.
///
/// # Panics
///
/// Panics if a name or roster entry is invalid.
#[must_use]
pub fn team(name: &str, members: &[(&str, bool)]) -> Team {
    let roster = members.iter().map(|(id, active)| {
        TeamMember::new(*id, id.to_uppercase(), *active).expect("valid member")
    });
    Team::new(TeamName::new(name).expect("valid team name"), roster).expect("valid team")
}

/// Creates the `backend` team used across tests.
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn seed_backend(directory: &PostgresDirectory) -> Result<(), BoxError> {
    directory
        .create_team_with_members(&team(
            "backend",
            &[
                ("alice", true),
                ("bob", true),
                ("carol", true),
                ("dave", true),
                ("erin", false),
            ],
        ))
        .await?;
    Ok(())
}
