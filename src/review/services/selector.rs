//! Random reviewer selection.

use crate::directory::domain::{User, UserId};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, PoisonError};

/// Picks reviewers uniformly at random from a candidate pool.
///
/// A partial Fisher-Yates pass fixes only the first `limit` positions, so
/// every subset of the requested size is equally likely. The generator sits behind a mutex so one selector can serve
/// concurrent requests.
pub struct ReviewerSelector {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ReviewerSelector {
    /// Creates a selector drawing from `rng`.
    #[must_use]
    pub fn from_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Creates a deterministic selector for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a selector seeded from operating system entropy.
    #[must_use]
    pub fn from_os_entropy() -> Self {
        Self::from_rng(ChaCha8Rng::from_os_rng())
    }

    /// Returns up to `limit` distinct candidate identifiers in random order.
    ///
    /// An empty pool yields an empty selection. A pool no larger than `limit`
    /// is returned whole, shuffled.
    #[must_use]
    pub fn select(&self, candidates: &[User], limit: usize) -> Vec<UserId> {
        let mut pool: Vec<UserId> = candidates.iter().map(|user| user.id().clone()).collect();
        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            partial_shuffle(&mut pool, limit, &mut *rng);
        }
        pool.truncate(limit);
        pool
    }

    /// Returns one random candidate, or `None` for an empty pool.
    #[must_use]
    pub fn select_one(&self, candidates: &[User]) -> Option<UserId> {
        self.select(candidates, 1).into_iter().next()
    }
}

impl std::fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}

/// Moves a uniform random choice of `count` items, in random order, to the
/// front of `items`.
fn partial_shuffle<T, R>(items: &mut [T], count: usize, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let len = items.len();
    for position in 0..count.min(len) {
        let pick = rng.random_range(position..len);
        items.swap(position, pick);
    }
}
