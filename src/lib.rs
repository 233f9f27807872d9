//! Reviewer assignment for pull requests.
//!
//! This crate assigns reviewers to pull requests from the author's team,
//! merges pull requests idempotently, and swaps or bulk-assigns reviewers
//! while keeping every multi-row write atomic and deadlock-free.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`, in-memory)
//!
//! # Modules
//!
//! - [`directory`]: Teams, users, and activity flags
//! - [`review`]: Pull requests, reviewer selection, and assignment rules
//! - [`persistence`]: Transactional units, deadlines, and lock ordering
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod directory;
pub mod error_code;
pub mod persistence;
pub mod review;
pub mod telemetry;
