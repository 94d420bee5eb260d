// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! ROB Web API - HTTP Server
//!
//! This crate exposes a benchmark engine (see `robweb-service`) over HTTP.
//! Handlers are thin: they authenticate, validate, delegate and serialize.
//!
//! # Request Flow
//!
//! ```text
//! request
//!   │
//!   ├─ AccessToken extractor      (api_key header; 403 when required and absent)
//!   ├─ Body validation            (FieldSpec; 400 on missing or unknown fields)
//!   ├─ AppState::service()        (one Session per request, closed on drop)
//!   ├─ Session::authenticate()    (403 on unknown or expired token)
//!   ├─ engine operation           (JSON document or ServiceError)
//!   ▼
//! response                        (fixed status, or ApiError envelope)
//! ```
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ROB_WEBAPI_PORT` | `5000` |
//! | `ROB_API_PATH` | `/rob/api/v1` |
//! | `ROB_API_BASEDIR` | `.rob` |
//! | `ROB_DATABASE` | unset |
//! | `ROB_WEBAPI_CONTENTLENGTH` | 16 MiB |
//! | `ROB_WEBAPI_LOG` | `<basedir>/log` |
//! | `ROB_UI_PATH` | unset (UI disabled) |

#![deny(missing_docs)]

/// Access token extraction.
pub mod auth;

/// Request body validation.
pub mod body;

/// Configuration loading.
pub mod config;

/// Error-to-status mapping.
pub mod error;

/// Tracing setup.
pub mod logging;

/// Query string parsing.
pub mod query;

/// Success response helpers.
pub mod response;

/// Route handlers.
pub mod routes;

/// Router assembly and server loop.
pub mod server;

/// Shared application state.
pub mod state;

pub use config::Config;
pub use error::{ApiError, ErrorCategory};
pub use server::{router, run_server};
pub use state::AppState;
