//! Transaction coordination shared by the directory and review adapters.
//!
//! Every multi-statement write in this crate runs as one all-or-nothing unit
//! with a deadline. Two backends provide that guarantee:
//!
//! - [`postgres`] opens a Diesel transaction, applies `SET LOCAL` timeouts,
//!   and rolls back on drop unless the unit was committed.
//! - [`memory`] snapshots the shared tables under a write lock and restores
//!   the snapshot on drop unless the unit was committed.
//!
//! Writes that touch several keys acquire them in ascending key order (see
//! [`lock_order`]) so concurrent units cannot deadlock on each other.

mod budget;
mod lock_order;
pub mod memory;
pub mod postgres;
pub(crate) mod schema;

pub use budget::TransactionBudget;
pub use lock_order::{lock_order, lock_order_by};
