// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service interface consumed by the HTTP layer.
//!
//! A [`ServiceFactory`] opens one [`Session`] per request. The session gives
//! access to per-resource services; every operation returns the JSON
//! document that is sent to the client unmodified.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::{FileHandle, GroupUpdate, NewGroup, RankingQuery, UploadFile, UserRef};
use crate::session::Session;

/// Opens service sessions.
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    /// Backend type identifier (e.g., "memory").
    fn backend_type(&self) -> &'static str;

    /// Open a new session. The session is closed when dropped.
    async fn connect(&self) -> Result<Session>;
}

/// One open connection to the engine.
#[async_trait]
pub trait ServiceHandle: Send + Sync {
    /// Resolve an access token to the user it was issued to.
    ///
    /// Fails with `Unauthenticated` if the token is unknown or expired.
    async fn authenticate(&self, token: &str) -> Result<UserRef>;

    /// Service descriptor operations.
    fn server(&self) -> &dyn ServerService;

    /// User management.
    fn users(&self) -> &dyn UserService;

    /// Workflow templates and leaderboards.
    fn workflows(&self) -> &dyn WorkflowService;

    /// User groups (submissions).
    fn groups(&self) -> &dyn GroupService;

    /// Workflow runs.
    fn runs(&self) -> &dyn RunService;

    /// Files uploaded to a group.
    fn uploads(&self) -> &dyn UploadService;

    /// Release the connection. Called exactly once, by the session guard.
    fn close(&mut self);
}

/// Service descriptor.
#[async_trait]
pub trait ServerService: Send + Sync {
    /// Name, version, route table and whether `token` is valid.
    async fn service_descriptor(&self, token: Option<&str>) -> Result<Value>;
}

/// User management.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Activate a registered user.
    async fn activate_user(&self, user_id: &str) -> Result<Value>;

    /// List users, optionally filtered by a user name prefix.
    async fn list_users(&self, query: Option<&str>) -> Result<Value>;

    /// Authenticate with name and password and issue an access token.
    async fn login_user(&self, username: &str, password: &str) -> Result<Value>;

    /// Invalidate an access token.
    async fn logout_user(&self, token: &str) -> Result<Value>;

    /// Register a new user. With `verify` the user is inactive until
    /// activated.
    async fn register_user(&self, username: &str, password: &str, verify: bool) -> Result<Value>;

    /// Create a password reset request for a user.
    async fn request_password_reset(&self, username: &str) -> Result<Value>;

    /// Apply a password reset request.
    async fn reset_password(&self, request_id: &str, password: &str) -> Result<Value>;

    /// The user an access token belongs to, including the token.
    async fn whoami_user(&self, token: &str) -> Result<Value>;
}

/// Workflow templates.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// List all workflows.
    async fn list_workflows(&self) -> Result<Value>;

    /// Workflow handle; includes the user's groups when a user is given.
    async fn get_workflow(&self, workflow_id: &str, user: Option<&UserRef>) -> Result<Value>;

    /// Leaderboard of successful runs.
    async fn get_ranking(&self, workflow_id: &str, query: &RankingQuery) -> Result<Value>;

    /// Archive of all post-processing result files.
    async fn get_result_archive(&self, workflow_id: &str) -> Result<FileHandle>;

    /// A single post-processing result file.
    async fn get_result_file(&self, workflow_id: &str, file_id: &str) -> Result<FileHandle>;
}

/// User groups.
#[async_trait]
pub trait GroupService: Send + Sync {
    /// Create a group; the user becomes its owner and a member.
    async fn create_group(&self, user: &UserRef, workflow_id: &str, group: NewGroup)
    -> Result<Value>;

    /// Groups the user is a member of, optionally restricted to a workflow.
    async fn list_groups(&self, user: &UserRef, workflow_id: Option<&str>) -> Result<Value>;

    /// Group handle.
    async fn get_group(&self, user: &UserRef, group_id: &str) -> Result<Value>;

    /// Update group name or members.
    async fn update_group(&self, user: &UserRef, group_id: &str, update: GroupUpdate)
    -> Result<Value>;

    /// Delete a group with all its runs and uploaded files.
    async fn delete_group(&self, user: &UserRef, group_id: &str) -> Result<()>;
}

/// Workflow runs.
#[async_trait]
pub trait RunService: Send + Sync {
    /// Start a run for a group with the given argument list.
    async fn start_run(&self, user: &UserRef, group_id: &str, arguments: Vec<Value>)
    -> Result<Value>;

    /// All runs of a group.
    async fn list_runs(&self, user: &UserRef, group_id: &str) -> Result<Value>;

    /// Identifiers of a group's runs in a state (active runs if `None`).
    async fn poll_runs(&self, user: &UserRef, group_id: &str, state: Option<&str>)
    -> Result<Value>;

    /// Run handle.
    async fn get_run(&self, user: &UserRef, run_id: &str) -> Result<Value>;

    /// Cancel an active run.
    async fn cancel_run(&self, user: &UserRef, run_id: &str, reason: Option<&str>)
    -> Result<Value>;

    /// Delete an inactive run.
    async fn delete_run(&self, user: &UserRef, run_id: &str) -> Result<()>;

    /// Archive of all result files of a successful run.
    async fn get_result_archive(&self, run_id: &str) -> Result<FileHandle>;

    /// A single result file of a successful run.
    async fn get_result_file(&self, run_id: &str, file_id: &str) -> Result<FileHandle>;
}

/// Files uploaded to a group.
#[async_trait]
pub trait UploadService: Send + Sync {
    /// List uploaded files.
    async fn list_uploaded_files(&self, user: &UserRef, group_id: &str) -> Result<Value>;

    /// Store an uploaded file.
    async fn upload_file(&self, user: &UserRef, group_id: &str, file: UploadFile)
    -> Result<Value>;

    /// Download an uploaded file. Identifiers act as capabilities, no user
    /// is required.
    async fn get_uploaded_file(&self, group_id: &str, file_id: &str) -> Result<FileHandle>;

    /// Delete an uploaded file.
    async fn delete_file(&self, user: &UserRef, group_id: &str, file_id: &str) -> Result<()>;
}
