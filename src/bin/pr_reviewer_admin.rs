//! Operator utility for the reviewer-assignment database.
//!
//! Usage:
//!
//! ```text
//! pr_reviewer_admin <operation>
//! ```
//!
//! The `operation` must be `migrate` or `stats`. `migrate` creates any
//! missing tables and indexes. `stats` writes pull request and directory
//! counts to stdout as a single JSON object:
//!
//! ```json
//! {
//!   "total_prs": 12,
//!   "open_prs": 4,
//!   "merged_prs": 8,
//!   "total_teams": 3,
//!   "total_users": 17,
//!   "active_users": 15
//! }
//! ```
//!
//! Connection settings come from the `POSTGRES_*` environment variables.

use mockable::DefaultClock;
use pr_reviewer::config::ServiceConfig;
use pr_reviewer::directory::adapters::postgres::PostgresDirectory;
use pr_reviewer::persistence::postgres::{PgPool, apply_schema, build_pool};
use pr_reviewer::review::adapters::postgres::PostgresPullRequestRepository;
use pr_reviewer::review::services::{ReviewAssignmentService, ReviewerSelector};
use pr_reviewer::telemetry::init_tracing;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
enum AdminError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error("database connection failed: {0}")]
    Connect(#[source] diesel::r2d2::PoolError),
    #[error("schema migration failed: {0}")]
    Migrate(#[source] BoxError),
    #[error("stats query failed: {0}")]
    Stats(#[source] BoxError),
    #[error("failed to write output: {0}")]
    Output(#[source] BoxError),
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Migrate,
    Stats,
}

impl Operation {
    fn parse(arg: &str) -> Result<Self, AdminError> {
        match arg {
            "migrate" => Ok(Self::Migrate),
            "stats" => Ok(Self::Stats),
            other => Err(AdminError::InvalidArgs(format!(
                "unknown operation '{other}'; expected migrate or stats"
            ))),
        }
    }
}

fn main() -> Result<(), BoxError> {
    let operation = parse_args(env::args().skip(1))?;
    let config = ServiceConfig::from_env()?;
    init_tracing(&config.log)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AdminError::RuntimeInit)?;
    let pool = build_pool(&config.database).map_err(AdminError::Connect)?;

    runtime.block_on(async {
        match operation {
            Operation::Migrate => migrate(pool).await,
            Operation::Stats => print_stats(pool, &config).await,
        }
    })?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Operation, AdminError> {
    let operation = args
        .next()
        .ok_or_else(|| AdminError::InvalidArgs("missing operation".to_owned()))?;
    if let Some(extra) = args.next() {
        return Err(AdminError::InvalidArgs(format!(
            "unexpected argument '{extra}'"
        )));
    }
    Operation::parse(&operation)
}

async fn migrate(pool: PgPool) -> Result<(), AdminError> {
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut connection = pool.get()?;
        apply_schema(&mut connection)?;
        Ok(())
    })
    .await
    .map_err(|err| AdminError::Migrate(Box::new(err)))?
    .map_err(AdminError::Migrate)?;
    info!("schema migration complete");
    Ok(())
}

async fn print_stats(pool: PgPool, config: &ServiceConfig) -> Result<(), AdminError> {
    let service = ReviewAssignmentService::new(
        Arc::new(PostgresPullRequestRepository::with_budget(
            pool.clone(),
            config.transactions,
        )),
        Arc::new(PostgresDirectory::with_budget(pool, config.transactions)),
        Arc::new(DefaultClock),
        Arc::new(ReviewerSelector::from_os_entropy()),
    );
    let stats = service
        .stats()
        .await
        .map_err(|err| AdminError::Stats(Box::new(err)))?;
    let rendered =
        serde_json::to_string_pretty(&stats).map_err(|err| AdminError::Output(Box::new(err)))?;
    writeln!(io::stdout().lock(), "{rendered}").map_err(|err| AdminError::Output(Box::new(err)))
}
