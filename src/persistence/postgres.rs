//! `PostgreSQL` plumbing shared by the Diesel adapters.

use crate::config::DatabaseConfig;
use diesel::connection::{AnsiTransactionManager, SimpleConnection, TransactionManager};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;
use tracing::{debug, error};

/// `PostgreSQL` connection pool type used by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// DDL for the reviewer-assignment tables. Every statement is idempotent.
pub const SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_review_tables/up.sql");

/// Builds a connection pool from database settings.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connections.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url());
    Pool::builder().max_size(config.pool_size).build(manager)
}

/// Creates the reviewer-assignment tables when they are missing.
///
/// # Errors
///
/// Returns the Diesel error raised by the first failing statement.
pub fn apply_schema(connection: &mut PgConnection) -> QueryResult<()> {
    connection.batch_execute(SCHEMA_SQL)
}

/// Database failure categories the adapters translate into semantic errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFault {
    /// A unique constraint rejected the write.
    UniqueViolation(Option<String>),
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation(Option<String>),
    /// The unit exceeded its lock or statement deadline.
    Timeout,
    /// Anything else.
    Other,
}

/// Classifies a Diesel error.
pub(crate) fn classify(err: &DieselError) -> DbFault {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFault::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DbFault::ForeignKeyViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(_, info) if is_deadline_message(info.message()) => {
            DbFault::Timeout
        }
        _ => DbFault::Other,
    }
}

fn is_deadline_message(message: &str) -> bool {
    message.contains("statement timeout") || message.contains("lock timeout")
}

/// A transactional unit on a single connection.
///
/// The unit is rolled back when dropped without [`PgTransaction::commit`],
/// which covers early returns through `?` as well as panics.
pub(crate) struct PgTransaction<'conn> {
    connection: &'conn mut PgConnection,
    label: &'static str,
    finished: bool,
}

impl<'conn> PgTransaction<'conn> {
    /// Opens a unit whose locks and statements must finish within `deadline`.
    pub(crate) fn begin(
        connection: &'conn mut PgConnection,
        label: &'static str,
        deadline: Duration,
    ) -> QueryResult<Self> {
        AnsiTransactionManager::begin_transaction(connection)?;
        let mut unit = Self {
            connection,
            label,
            finished: false,
        };
        unit.apply_deadline(deadline)?;
        debug!(unit = label, deadline_ms = deadline_millis(deadline), "transaction opened");
        Ok(unit)
    }

    fn apply_deadline(&mut self, deadline: Duration) -> QueryResult<()> {
        let millis = deadline_millis(deadline);
        self.connection.batch_execute(&format!(
            "SET LOCAL lock_timeout = {millis}; SET LOCAL statement_timeout = {millis};"
        ))
    }

    /// Returns the connection bound to this unit.
    pub(crate) fn connection(&mut self) -> &mut PgConnection {
        self.connection
    }

    /// Commits the unit.
    pub(crate) fn commit(mut self) -> QueryResult<()> {
        self.finished = true;
        AnsiTransactionManager::commit_transaction(self.connection)?;
        debug!(unit = self.label, "transaction committed");
        Ok(())
    }
}

impl Drop for PgTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match AnsiTransactionManager::rollback_transaction(self.connection) {
            Ok(()) => debug!(unit = self.label, "transaction rolled back"),
            Err(err) => error!(unit = self.label, error = %err, "transaction rollback failed"),
        }
    }
}

fn deadline_millis(deadline: Duration) -> u128 {
    deadline.as_millis().max(1)
}
