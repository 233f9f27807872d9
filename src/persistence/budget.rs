//! Deadlines applied to transactional units.

use std::time::Duration;

/// Upper bounds on how long a transactional unit may run.
///
/// Single pull-request writes use the standard budget. Team-wide writes that
/// upsert or deactivate many users use the bulk budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionBudget {
    standard: Duration,
    bulk: Duration,
}

impl TransactionBudget {
    /// Default deadline for single pull-request units.
    pub const DEFAULT_STANDARD: Duration = Duration::from_secs(5);

    /// Default deadline for team-wide units.
    pub const DEFAULT_BULK: Duration = Duration::from_secs(10);

    /// Creates a budget from explicit deadlines.
    #[must_use]
    pub const fn new(standard: Duration, bulk: Duration) -> Self {
        Self { standard, bulk }
    }

    /// Returns the deadline for single pull-request units.
    #[must_use]
    pub const fn standard(self) -> Duration {
        self.standard
    }

    /// Returns the deadline for team-wide units.
    #[must_use]
    pub const fn bulk(self) -> Duration {
        self.bulk
    }
}

impl Default for TransactionBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STANDARD, Self::DEFAULT_BULK)
    }
}
