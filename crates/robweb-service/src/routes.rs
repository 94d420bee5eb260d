// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! URL patterns of the API.
//!
//! Patterns are relative to the configured API prefix and use `{param}`
//! placeholders. The HTTP router registers exactly these patterns and the
//! service descriptor publishes them, so both always agree.

use serde::Serialize;

/// Service descriptor.
pub const SERVICE_DESCRIPTOR: &str = "/";

/// Workflow listing.
pub const WORKFLOWS_LIST: &str = "/workflows";
/// Workflow handle.
pub const WORKFLOWS_GET: &str = "/workflows/{workflowId}";
/// Workflow leaderboard.
pub const WORKFLOWS_RANKING: &str = "/workflows/{workflowId}/leaderboard";
/// Post-processing result archive.
pub const WORKFLOWS_DOWNLOAD_ARCHIVE: &str = "/workflows/{workflowId}/downloads/archive";
/// Post-processing result file.
pub const WORKFLOWS_DOWNLOAD_FILE: &str = "/workflows/{workflowId}/downloads/files/{fileId}";
/// Groups of a workflow (create and list).
pub const WORKFLOWS_GROUPS: &str = "/workflows/{workflowId}/groups";

/// All groups of the authenticated user.
pub const GROUPS_LIST: &str = "/groups";
/// Group handle (get, update, delete).
pub const GROUPS_GET: &str = "/groups/{userGroupId}";
/// Runs of a group (list, start).
pub const GROUPS_RUNS: &str = "/groups/{userGroupId}/runs";
/// Run identifiers of a group filtered by state.
pub const GROUPS_POLL_RUNS: &str = "/groups/{userGroupId}/runs/poll";

/// Run handle (get, cancel, delete).
pub const RUNS_GET: &str = "/runs/{runId}";
/// Run result archive.
pub const RUNS_DOWNLOAD_ARCHIVE: &str = "/runs/{runId}/downloads/archive";
/// Run result file.
pub const RUNS_DOWNLOAD_FILE: &str = "/runs/{runId}/downloads/files/{fileId}";

/// Uploaded files of a group (list, upload).
pub const UPLOADS_FILES: &str = "/uploads/{userGroupId}/files";
/// Uploaded file (download, delete).
pub const UPLOADS_FILE: &str = "/uploads/{userGroupId}/files/{fileId}";

/// User listing.
pub const USERS_LIST: &str = "/users";
/// Activate a registered user.
pub const USERS_ACTIVATE: &str = "/users/activate";
/// Login.
pub const USERS_LOGIN: &str = "/users/login";
/// Logout.
pub const USERS_LOGOUT: &str = "/users/logout";
/// Register a new user.
pub const USERS_REGISTER: &str = "/users/register";
/// Request a password reset.
pub const USERS_PASSWORD_REQUEST: &str = "/users/password/request";
/// Apply a password reset.
pub const USERS_PASSWORD_RESET: &str = "/users/password/reset";
/// Current user.
pub const USERS_WHOAMI: &str = "/users/whoami";

/// An entry of the route table published by the service descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Stable identifier of the action.
    pub action: &'static str,
    /// URL pattern relative to the API prefix.
    pub pattern: &'static str,
}

const fn route(action: &'static str, pattern: &'static str) -> Route {
    Route { action, pattern }
}

/// Route table published by the service descriptor.
pub const ROUTES: &[Route] = &[
    route("service:descriptor", SERVICE_DESCRIPTOR),
    route("workflows:list", WORKFLOWS_LIST),
    route("workflows:get", WORKFLOWS_GET),
    route("workflows:ranking", WORKFLOWS_RANKING),
    route("workflows:download:archive", WORKFLOWS_DOWNLOAD_ARCHIVE),
    route("workflows:download:file", WORKFLOWS_DOWNLOAD_FILE),
    route("workflows:groups", WORKFLOWS_GROUPS),
    route("groups:list", GROUPS_LIST),
    route("groups:get", GROUPS_GET),
    route("groups:runs", GROUPS_RUNS),
    route("groups:runs:poll", GROUPS_POLL_RUNS),
    route("runs:get", RUNS_GET),
    route("runs:download:archive", RUNS_DOWNLOAD_ARCHIVE),
    route("runs:download:file", RUNS_DOWNLOAD_FILE),
    route("uploads:files", UPLOADS_FILES),
    route("uploads:file", UPLOADS_FILE),
    route("users:list", USERS_LIST),
    route("users:activate", USERS_ACTIVATE),
    route("users:login", USERS_LOGIN),
    route("users:logout", USERS_LOGOUT),
    route("users:register", USERS_REGISTER),
    route("users:password:request", USERS_PASSWORD_REQUEST),
    route("users:password:reset", USERS_PASSWORD_RESET),
    route("users:whoami", USERS_WHOAMI),
];

/// Join the API prefix and a relative pattern.
///
/// The descriptor pattern `/` maps to the bare prefix (or `/` when the
/// prefix is empty).
pub fn full_path(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if pattern == SERVICE_DESCRIPTOR {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{prefix}{pattern}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_path() {
        assert_eq!(full_path("/rob/api/v1", WORKFLOWS_LIST), "/rob/api/v1/workflows");
        assert_eq!(full_path("/rob/api/v1/", RUNS_GET), "/rob/api/v1/runs/{runId}");
        assert_eq!(full_path("/rob/api/v1", SERVICE_DESCRIPTOR), "/rob/api/v1");
        assert_eq!(full_path("", SERVICE_DESCRIPTOR), "/");
        assert_eq!(full_path("", USERS_LOGIN), "/users/login");
    }

    #[test]
    fn test_route_actions_unique() {
        let actions: HashSet<_> = ROUTES.iter().map(|r| r.action).collect();
        assert_eq!(actions.len(), ROUTES.len());
    }
}
