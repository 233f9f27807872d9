//! Domain model for teams and users.
//!
//! Users belong to exactly one team and carry an activity flag. Only active
//! users are eligible to review pull requests.

mod error;
mod ids;
mod team;
mod user;

pub use error::DirectoryDomainError;
pub use ids::{TeamName, UserId};
pub use team::Team;
pub use user::{TeamMember, User};
