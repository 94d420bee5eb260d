// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow listing, handles, leaderboards and post-processing downloads.
//!
//! Workflows and their results are public. The handle includes the
//! caller's groups when a valid token is supplied.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;

use robweb_service::routes::{
    WORKFLOWS_DOWNLOAD_ARCHIVE, WORKFLOWS_DOWNLOAD_FILE, WORKFLOWS_GET, WORKFLOWS_LIST,
    WORKFLOWS_RANKING, full_path,
};

use crate::auth::AccessToken;
use crate::error::Result;
use crate::query::QueryParams;
use crate::response;
use crate::state::AppState;

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(&full_path(prefix, WORKFLOWS_LIST), get(list_workflows))
        .route(&full_path(prefix, WORKFLOWS_GET), get(get_workflow))
        .route(&full_path(prefix, WORKFLOWS_RANKING), get(get_leaderboard))
        .route(
            &full_path(prefix, WORKFLOWS_DOWNLOAD_ARCHIVE),
            get(download_archive),
        )
        .route(&full_path(prefix, WORKFLOWS_DOWNLOAD_FILE), get(download_file))
}

async fn list_workflows(State(state): State<AppState>) -> Result<Response> {
    let session = state.service().await?;
    let doc = session.workflows().list_workflows().await?;
    Ok(response::ok(doc))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    token: Option<AccessToken>,
) -> Result<Response> {
    let session = state.service().await?;
    let user = match &token {
        Some(token) => Some(session.authenticate(token.as_str()).await?),
        None => None,
    };
    let doc = session
        .workflows()
        .get_workflow(&workflow_id, user.as_ref())
        .await?;
    Ok(response::ok(doc))
}

async fn get_leaderboard(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    params: QueryParams,
) -> Result<Response> {
    let query = params.ranking_query();
    let session = state.service().await?;
    let doc = session
        .workflows()
        .get_ranking(&workflow_id, &query)
        .await?;
    Ok(response::ok(doc))
}

async fn download_archive(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Response> {
    let session = state.service().await?;
    let handle = session.workflows().get_result_archive(&workflow_id).await?;
    response::file(handle)
}

async fn download_file(
    State(state): State<AppState>,
    Path((workflow_id, file_id)): Path<(String, String)>,
) -> Result<Response> {
    let session = state.service().await?;
    let handle = session
        .workflows()
        .get_result_file(&workflow_id, &file_id)
        .await?;
    response::file(handle)
}
