//! Diesel row models for pull request persistence.

use crate::persistence::schema::{pr_reviewers, pull_requests};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for pull request records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pull_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PullRequestRow {
    /// Pull request identifier.
    pub pull_request_id: String,
    /// Human-readable title.
    pub pull_request_name: String,
    /// Author identifier.
    pub author_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Insert model for pull request records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pull_requests)]
pub struct NewPullRequestRow {
    /// Pull request identifier.
    pub pull_request_id: String,
    /// Human-readable title.
    pub pull_request_name: String,
    /// Author identifier.
    pub author_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp.
    pub merged_at: Option<DateTime<Utc>>,
}

/// Insert model for reviewer assignments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pr_reviewers)]
pub struct NewReviewerRow<'row> {
    /// Reviewed pull request.
    pub pull_request_id: &'row str,
    /// Assigned reviewer.
    pub reviewer_id: &'row str,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}
