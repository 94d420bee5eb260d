// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! ROB Service - Benchmark Engine Interface
//!
//! This crate defines the interface the ROB Web API consumes from the
//! benchmark engine, and ships an in-memory engine implementing it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │        robweb-server         │
//! │   (routes, validation, auth) │
//! └──────────────────────────────┘
//!                │ ServiceFactory::connect()
//!                ▼
//! ┌──────────────────────────────┐
//! │  Session (closed on drop)    │
//! │  users / workflows / groups  │
//! │  runs / uploads / server     │
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │  Engine (MemoryBackend or an │
//! │  external implementation)    │
//! └──────────────────────────────┘
//! ```
//!
//! # Operations
//!
//! | Service | Operations |
//! |---------|------------|
//! | `ServerService` | `service_descriptor` |
//! | `UserService` | `activate_user`, `list_users`, `login_user`, `logout_user`, `register_user`, `request_password_reset`, `reset_password`, `whoami_user` |
//! | `WorkflowService` | `list_workflows`, `get_workflow`, `get_ranking`, `get_result_archive`, `get_result_file` |
//! | `GroupService` | `create_group`, `list_groups`, `get_group`, `update_group`, `delete_group` |
//! | `RunService` | `start_run`, `list_runs`, `poll_runs`, `get_run`, `cancel_run`, `delete_run`, `get_result_archive`, `get_result_file` |
//! | `UploadService` | `list_uploaded_files`, `upload_file`, `get_uploaded_file`, `delete_file` |
//!
//! Every operation returns the JSON document sent to the client, or a
//! [`ServiceError`] the HTTP layer maps to a status code.

#![deny(missing_docs)]

/// Service traits.
pub mod api;

/// Error types.
pub mod error;

/// JSON field names.
pub mod labels;

/// In-memory engine.
pub mod memory;

/// Request-side value types.
pub mod model;

/// URL patterns and the published route table.
pub mod routes;

/// Scoped session guard.
pub mod session;

pub use api::{
    GroupService, RunService, ServerService, ServiceFactory, ServiceHandle, UploadService,
    UserService, WorkflowService,
};
pub use error::{ObjectKind, Result, ServiceError};
pub use memory::{MemoryBackend, MemoryBackendBuilder};
pub use model::{FileHandle, GroupUpdate, NewGroup, RankingQuery, SortColumn, UploadFile, UserRef};
pub use session::Session;
