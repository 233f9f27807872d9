//! Service layer for reviewer assignment.

mod assignment;
mod error;
mod selector;

pub use assignment::{
    AssignReviewersRequest, CreatePullRequestRequest, ReassignReviewerRequest, Reassignment,
    ReviewAssignmentService, ReviewStats,
};
pub use error::{ReviewServiceError, ReviewServiceResult};
pub use selector::ReviewerSelector;
