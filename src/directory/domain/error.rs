//! Error types for directory domain validation.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing directory values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The user identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The user identifier exceeds the storage limit.
    #[error("user id '{0}' exceeds 255 characters")]
    UserIdTooLong(String),

    /// The team name is empty after trimming.
    #[error("team name must not be empty")]
    EmptyTeamName,

    /// The team name exceeds the storage limit.
    #[error("team name '{0}' exceeds 255 characters")]
    TeamNameTooLong(String),

    /// The username is empty after trimming.
    #[error("username for user {0} must not be empty")]
    EmptyUsername(UserId),

    /// The username exceeds the storage limit.
    #[error("username for user {0} exceeds 255 characters")]
    UsernameTooLong(UserId),

    /// The same user appears more than once in a team roster.
    #[error("user {0} is listed more than once")]
    DuplicateMember(UserId),
}
