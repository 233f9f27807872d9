//! Diesel schema for the reviewer-assignment tables.

diesel::table! {
    /// Teams known to the directory.
    teams (team_name) {
        /// Unique team name.
        #[max_length = 255]
        team_name -> Varchar,
    }
}

diesel::table! {
    /// Users and their team membership.
    users (user_id) {
        /// Unique user identifier.
        #[max_length = 255]
        user_id -> Varchar,
        /// Display name.
        #[max_length = 255]
        username -> Varchar,
        /// Owning team.
        #[max_length = 255]
        team_name -> Varchar,
        /// Whether the user may be assigned reviews.
        is_active -> Bool,
    }
}

diesel::table! {
    /// Pull requests and their lifecycle state.
    pull_requests (pull_request_id) {
        /// Unique pull request identifier.
        #[max_length = 255]
        pull_request_id -> Varchar,
        /// Human-readable title.
        #[max_length = 255]
        pull_request_name -> Varchar,
        /// Author user identifier.
        #[max_length = 255]
        author_id -> Varchar,
        /// Lifecycle status, `OPEN` or `MERGED`.
        #[max_length = 16]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Merge timestamp, set once when the pull request merges.
        merged_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Reviewer assignments keyed by pull request and reviewer.
    pr_reviewers (pull_request_id, reviewer_id) {
        /// Reviewed pull request.
        #[max_length = 255]
        pull_request_id -> Varchar,
        /// Assigned reviewer.
        #[max_length = 255]
        reviewer_id -> Varchar,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
    }
}

diesel::joinable!(pr_reviewers -> pull_requests (pull_request_id));
diesel::joinable!(users -> teams (team_name));

diesel::allow_tables_to_appear_in_same_query!(teams, users, pull_requests, pr_reviewers);
