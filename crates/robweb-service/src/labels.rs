// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! JSON field names used in request and response documents.

#![allow(missing_docs)] // Constant names are self-describing

// Generic
pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const DESCRIPTION: &str = "description";
pub const INSTRUCTIONS: &str = "instructions";
pub const MESSAGE: &str = "message";
pub const VERSION: &str = "version";

// Service descriptor
pub const SERVICE_NAME: &str = "name";
pub const SERVICE_VERSION: &str = "version";
pub const SERVICE_VALID_TOKEN: &str = "validToken";
pub const SERVICE_USERNAME: &str = "username";
pub const SERVICE_ROUTES: &str = "routes";
pub const ROUTE_ACTION: &str = "action";
pub const ROUTE_PATTERN: &str = "pattern";

// Users
pub const USER_ID: &str = "id";
pub const USER_NAME: &str = "username";
pub const USER_PASSWORD: &str = "password";
pub const USER_VERIFY: &str = "verify";
pub const USER_REQUEST_ID: &str = "requestId";
pub const USER_TOKEN: &str = "token";
pub const USER_LIST: &str = "users";

// Workflows
pub const WORKFLOW_LIST: &str = "workflows";
pub const WORKFLOW_PARAMETERS: &str = "parameters";
pub const WORKFLOW_SCHEMA: &str = "schema";
pub const WORKFLOW_POSTPROC: &str = "postproc";
pub const WORKFLOW_GROUPS: &str = "groups";
pub const RANKING: &str = "ranking";
pub const COLUMN_ID: &str = "id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_TYPE: &str = "type";

// Groups
pub const GROUP_ID: &str = "id";
pub const GROUP_NAME: &str = "name";
pub const GROUP_MEMBERS: &str = "members";
pub const GROUP_PARAMETERS: &str = "parameters";
pub const GROUP_WORKFLOW: &str = "workflow";
pub const GROUP_LIST: &str = "groups";
pub const GROUP_UPLOADS: &str = "files";

// Runs
pub const RUN_ID: &str = "id";
pub const RUN_ARGUMENTS: &str = "arguments";
pub const RUN_CANCEL_REASON: &str = "reason";
pub const RUN_STATE: &str = "state";
pub const RUN_LIST: &str = "runs";
pub const RUN_GROUP: &str = "group";
pub const RUN_CREATED_AT: &str = "createdAt";
pub const RUN_STARTED_AT: &str = "startedAt";
pub const RUN_FINISHED_AT: &str = "finishedAt";
pub const RUN_MESSAGES: &str = "messages";
pub const RUN_FILES: &str = "files";
pub const RUN_RESULTS: &str = "results";
pub const ARG_ID: &str = "name";
pub const ARG_VALUE: &str = "value";

// Files
pub const FILE_ID: &str = "id";
pub const FILE_NAME: &str = "name";
pub const FILE_SIZE: &str = "size";
pub const FILE_CREATED_AT: &str = "createdAt";
pub const FILE_LIST: &str = "files";
