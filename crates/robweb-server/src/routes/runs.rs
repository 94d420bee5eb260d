// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow runs of a group.
//!
//! Run management requires a login. Result downloads do not, so that
//! browser redirects to download links work without the token header.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;

use robweb_service::labels;
use robweb_service::routes::{
    GROUPS_POLL_RUNS, GROUPS_RUNS, RUNS_DOWNLOAD_ARCHIVE, RUNS_DOWNLOAD_FILE, RUNS_GET, full_path,
};

use crate::auth::AccessToken;
use crate::body::{FieldSpec, RawBody, optional_body, optional_list, optional_str, validate_body};
use crate::error::{ApiError, Result};
use crate::query::{QueryParams, RUN_STATE};
use crate::response;
use crate::state::AppState;

/// Body of a start run request.
pub const START_RUN: FieldSpec = FieldSpec::new(&[], &[labels::RUN_ARGUMENTS]);

/// Body of a cancel run request, if one is sent.
pub const CANCEL_RUN: FieldSpec = FieldSpec::new(&[labels::RUN_CANCEL_REASON], &[]);

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &full_path(prefix, GROUPS_RUNS),
            get(list_runs).post(start_run),
        )
        .route(&full_path(prefix, GROUPS_POLL_RUNS), get(poll_runs))
        .route(
            &full_path(prefix, RUNS_GET),
            get(get_run).put(cancel_run).delete(delete_run),
        )
        .route(
            &full_path(prefix, RUNS_DOWNLOAD_ARCHIVE),
            get(download_archive),
        )
        .route(&full_path(prefix, RUNS_DOWNLOAD_FILE), get(download_file))
}

async fn start_run(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
    RawBody(body): RawBody,
) -> Result<Response> {
    let doc = validate_body(&body, &START_RUN)?;
    let arguments = optional_list(&doc, labels::RUN_ARGUMENTS)?.unwrap_or_default();
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .runs()
        .start_run(&user, &group_id, arguments)
        .await
        .map_err(|e| ApiError::from(e).unknown_parameter_as_invalid())?;
    Ok(response::created(doc))
}

async fn list_runs(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.runs().list_runs(&user, &group_id).await?;
    Ok(response::ok(doc))
}

async fn poll_runs(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
    params: QueryParams,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .runs()
        .poll_runs(&user, &group_id, params.get(RUN_STATE))
        .await?;
    Ok(response::ok(doc))
}

async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.runs().get_run(&user, &run_id).await?;
    Ok(response::ok(doc))
}

async fn cancel_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    token: AccessToken,
    RawBody(body): RawBody,
) -> Result<Response> {
    let doc = optional_body(&body, &CANCEL_RUN)?;
    let reason = match &doc {
        Some(doc) => optional_str(doc, labels::RUN_CANCEL_REASON)?,
        None => None,
    };
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.runs().cancel_run(&user, &run_id, reason).await?;
    Ok(response::ok(doc))
}

async fn delete_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    session.runs().delete_run(&user, &run_id).await?;
    Ok(response::no_content())
}

async fn download_archive(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Response> {
    let session = state.service().await?;
    let handle = session.runs().get_result_archive(&run_id).await?;
    response::file(handle)
}

async fn download_file(
    State(state): State<AppState>,
    Path((run_id, file_id)): Path<(String, String)>,
) -> Result<Response> {
    let session = state.service().await?;
    let handle = session.runs().get_result_file(&run_id, &file_id).await?;
    response::file(handle)
}
