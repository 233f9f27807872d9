//! Diesel row models for directory persistence.

use crate::persistence::schema::users;
use diesel::prelude::*;

/// Row model for user records, used for reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Owning team.
    pub team_name: String,
    /// Whether the user may be assigned reviews.
    pub is_active: bool,
}
