// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service descriptor.

use axum::Router;
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;

use robweb_service::routes::{SERVICE_DESCRIPTOR, full_path};

use crate::auth::AccessToken;
use crate::error::Result;
use crate::response;
use crate::state::AppState;

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    let path = full_path(prefix, SERVICE_DESCRIPTOR);
    let router = Router::new().route(&path, get(service_descriptor));
    if path == "/" {
        router
    } else {
        router.route(&format!("{path}/"), get(service_descriptor))
    }
}

/// GET the service descriptor. The token is optional; the descriptor
/// reports whether it is valid.
async fn service_descriptor(
    State(state): State<AppState>,
    token: Option<AccessToken>,
) -> Result<Response> {
    let session = state.service().await?;
    let doc = session
        .server()
        .service_descriptor(token.as_ref().map(AccessToken::as_str))
        .await?;
    Ok(response::ok(doc))
}
