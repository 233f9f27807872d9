//! In-memory tables with snapshot-based transactional units.
//!
//! The directory and review in-memory adapters share one
//! [`InMemoryDatabase`] so that reviewer and author references can be
//! checked the way foreign keys are checked in `PostgreSQL`.

use crate::directory::domain::{TeamName, User, UserId};
use crate::review::domain::{PullRequestId, PullRequestStatus};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Shared handle to the in-memory tables.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

/// Stored pull request columns, without reviewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PullRequestRecord {
    pub(crate) name: String,
    pub(crate) author_id: UserId,
    pub(crate) status: PullRequestStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) merged_at: Option<DateTime<Utc>>,
}

/// The in-memory tables.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) teams: BTreeSet<TeamName>,
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) pull_requests: BTreeMap<PullRequestId, PullRequestRecord>,
    pub(crate) reviewers: BTreeMap<(PullRequestId, UserId), DateTime<Utc>>,
}

impl Tables {
    /// Returns the reviewers of a pull request in identifier order.
    pub(crate) fn reviewers_of(&self, pull_request_id: &PullRequestId) -> Vec<UserId> {
        self.reviewers
            .keys()
            .filter(|(assigned_to, _)| assigned_to == pull_request_id)
            .map(|(_, reviewer)| reviewer.clone())
            .collect()
    }
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the tables for reading.
    ///
    /// A poisoned lock is recovered: the unit that panicked restored its
    /// snapshot while unwinding, so the tables are consistent.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a transactional unit holding the write lock.
    pub(crate) fn begin(&self, label: &'static str) -> MemoryTransaction<'_> {
        let guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = guard.clone();
        MemoryTransaction {
            guard,
            snapshot: Some(snapshot),
            label,
        }
    }

    /// Runs `unit` as one all-or-nothing unit.
    ///
    /// The unit commits when `unit` returns `Ok` and rolls back otherwise.
    pub(crate) fn transact<T, E, F>(&self, label: &'static str, unit: F) -> Result<T, E>
    where
        F: FnOnce(&mut Tables) -> Result<T, E>,
    {
        let mut transaction = self.begin(label);
        let output = unit(transaction.tables())?;
        transaction.commit();
        Ok(output)
    }
}

/// A unit of work over the in-memory tables.
///
/// Dropping the unit without [`MemoryTransaction::commit`] restores the
/// tables to their state when the unit began.
pub(crate) struct MemoryTransaction<'db> {
    guard: RwLockWriteGuard<'db, Tables>,
    snapshot: Option<Tables>,
    label: &'static str,
}

impl MemoryTransaction<'_> {
    /// Returns the tables for modification.
    pub(crate) fn tables(&mut self) -> &mut Tables {
        &mut self.guard
    }

    /// Commits the unit, discarding the snapshot.
    pub(crate) fn commit(mut self) {
        self.snapshot = None;
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
            debug!(unit = self.label, "in-memory transaction rolled back");
        }
    }
}
