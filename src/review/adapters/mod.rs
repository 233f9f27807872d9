//! Adapter implementations for the pull request ports.

pub mod memory;
pub mod postgres;
