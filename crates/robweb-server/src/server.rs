// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Router assembly and the HTTP server loop.

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use robweb_service::ServiceFactory;

use crate::config::Config;
use crate::error::ApiError;
use crate::response;
use crate::routes::{self, ui};
use crate::state::AppState;

/// Message for requests whose body exceeds the configured maximum.
pub const TOO_LARGE_MESSAGE: &str = "request body exceeds the maximum content length";

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let mut app = routes::api_routes(&config.api_path);
    if let Some(ui_path) = &config.ui_path {
        info!(path = %ui_path.display(), prefix = ui::UI_PREFIX, "Serving UI");
        app = app.merge(ui::routes(ui_path));
    }
    app.fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(config.max_content_length))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            limit_content_length,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until Ctrl-C is received.
pub async fn run_server(config: Config, backend: Arc<dyn ServiceFactory>) -> anyhow::Result<()> {
    let addr = config.bind_addr;
    let api_path = config.api_path.clone();
    let backend_type = backend.backend_type();
    let app = router(AppState::new(config, backend));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "Failed to bind HTTP server");
        e
    })?;

    info!(addr = %addr, api_path = %api_path, backend = backend_type, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, shutting down..."),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

/// Reject requests with a declared body larger than the maximum before any
/// handler runs. Bodies without a length are capped by `DefaultBodyLimit`.
async fn limit_content_length(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(length) = declared
        && length > state.config.max_content_length as u64
    {
        return ApiError::UploadTooLarge(TOO_LARGE_MESSAGE.to_string()).into_response();
    }
    next.run(request).await
}

async fn not_found() -> Response {
    response::json(StatusCode::NOT_FOUND, json!({ "message": "unknown resource" }))
}

async fn method_not_allowed() -> Response {
    response::json(
        StatusCode::METHOD_NOT_ALLOWED,
        json!({ "message": "method not allowed" }),
    )
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {details}")).into_response()
}
