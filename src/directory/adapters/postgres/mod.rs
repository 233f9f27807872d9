//! `PostgreSQL` adapter for the directory.

mod models;
mod repository;

pub use repository::PostgresDirectory;
