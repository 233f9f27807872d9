//! Bounded set of reviewers assigned to a pull request.

use super::ReviewDomainError;
use crate::directory::domain::UserId;
use serde::Serialize;

/// Maximum number of reviewers a pull request may carry.
pub const MAX_REVIEWERS: usize = 2;

/// Distinct reviewers of one pull request, never containing its author.
///
/// Reviewers are kept in identifier order, so two sets holding the same
/// reviewers compare equal however they were assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewerSet(Vec<UserId>);

impl ReviewerSet {
    /// Returns a set with no reviewers.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a reviewer set for a pull request written by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::ReviewerLimitExceeded`] when more than
    /// [`MAX_REVIEWERS`] reviewers are given,
    /// [`ReviewDomainError::DuplicateReviewer`] when a reviewer repeats, or
    /// [`ReviewDomainError::AuthorAsReviewer`] when the author is listed.
    pub fn for_author(
        author: &UserId,
        reviewers: impl IntoIterator<Item = UserId>,
    ) -> Result<Self, ReviewDomainError> {
        let mut set = Self::empty();
        for reviewer in reviewers {
            set.insert(author, reviewer)?;
        }
        Ok(set)
    }

    pub(super) fn insert(
        &mut self,
        author: &UserId,
        reviewer: UserId,
    ) -> Result<(), ReviewDomainError> {
        if &reviewer == author {
            return Err(ReviewDomainError::AuthorAsReviewer(reviewer));
        }
        if self.contains(&reviewer) {
            return Err(ReviewDomainError::DuplicateReviewer(reviewer));
        }
        if self.0.len() >= MAX_REVIEWERS {
            return Err(ReviewDomainError::ReviewerLimitExceeded {
                limit: MAX_REVIEWERS,
            });
        }
        let position = self.0.partition_point(|assigned| assigned < &reviewer);
        self.0.insert(position, reviewer);
        Ok(())
    }

    pub(super) fn remove(&mut self, reviewer: &UserId) -> bool {
        let before = self.0.len();
        self.0.retain(|assigned| assigned != reviewer);
        self.0.len() != before
    }

    /// Returns whether `reviewer` is assigned.
    #[must_use]
    pub fn contains(&self, reviewer: &UserId) -> bool {
        self.0.contains(reviewer)
    }

    /// Returns the number of assigned reviewers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no reviewer is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the reviewers in identifier order.
    #[must_use]
    pub fn as_slice(&self) -> &[UserId] {
        &self.0
    }

    /// Iterates over the reviewers in identifier order.
    pub fn iter(&self) -> std::slice::Iter<'_, UserId> {
        self.0.iter()
    }
}

impl<'set> IntoIterator for &'set ReviewerSet {
    type Item = &'set UserId;
    type IntoIter = std::slice::Iter<'set, UserId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
