// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Route handlers, one module per resource.
//!
//! Every handler follows the same sequence: extract the access token (if
//! the route takes one), validate the body (if the route accepts one), open
//! a service session, authenticate, call the engine, and return the
//! resulting document with the route's fixed status code. The session is
//! released when the handler returns.

pub mod descriptor;
pub mod groups;
pub mod runs;
pub mod ui;
pub mod uploads;
pub mod users;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// All API routes under the given prefix.
pub fn api_routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .merge(descriptor::routes(prefix))
        .merge(workflows::routes(prefix))
        .merge(groups::routes(prefix))
        .merge(runs::routes(prefix))
        .merge(uploads::routes(prefix))
        .merge(users::routes(prefix))
}
