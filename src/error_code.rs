//! Stable error codes reported to callers.

use serde::Serialize;
use std::fmt;

/// Machine-readable category of a service failure.
///
/// Each service error maps to exactly one code. Only [`ErrorCode::Internal`]
/// marks a failure the caller may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The pull request already exists.
    PrExists,
    /// The pull request has merged.
    PrMerged,
    /// The reviewer is not assigned to the pull request.
    NotAssigned,
    /// No eligible reviewer could be found.
    NoCandidate,
    /// The pull request already has reviewers.
    ReviewersAssigned,
    /// A referenced pull request, user, or team does not exist.
    NotFound,
    /// The request is malformed or breaks a business rule.
    BadRequest,
    /// Storage failed or a unit timed out.
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrExists => "PR_EXISTS",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::ReviewersAssigned => "REVIEWERS_ASSIGNED",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
