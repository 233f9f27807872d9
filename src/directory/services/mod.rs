//! Service layer for team and user management.

mod team;

pub use team::{
    AddTeamRequest, DirectoryServiceError, DirectoryServiceResult, TeamDeactivation,
    TeamDirectoryService,
};
