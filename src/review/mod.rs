//! Pull request reviewer assignment.
//!
//! This module creates pull requests with automatically selected reviewers,
//! merges them idempotently, swaps individual reviewers, and assigns initial
//! reviewer sets. Every write is a single transactional unit in the
//! underlying store. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
