// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! User groups (benchmark submissions). Every route requires a login.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;

use robweb_service::labels;
use robweb_service::routes::{GROUPS_GET, GROUPS_LIST, WORKFLOWS_GROUPS, full_path};
use robweb_service::{GroupUpdate, NewGroup};

use crate::auth::AccessToken;
use crate::body::{
    FieldSpec, RawBody, optional_list, optional_str, optional_str_list, require_str,
    validate_body,
};
use crate::error::{ApiError, Result};
use crate::response;
use crate::state::AppState;

/// Body of a create group request.
pub const CREATE_GROUP: FieldSpec = FieldSpec::new(
    &[labels::GROUP_NAME],
    &[labels::GROUP_MEMBERS, labels::GROUP_PARAMETERS],
);

/// Body of an update group request.
pub const UPDATE_GROUP: FieldSpec =
    FieldSpec::new(&[], &[labels::GROUP_NAME, labels::GROUP_MEMBERS]);

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &full_path(prefix, WORKFLOWS_GROUPS),
            get(list_workflow_groups).post(create_group),
        )
        .route(&full_path(prefix, GROUPS_LIST), get(list_groups))
        .route(
            &full_path(prefix, GROUPS_GET),
            get(get_group).put(update_group).delete(delete_group),
        )
}

async fn create_group(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    token: AccessToken,
    RawBody(body): RawBody,
) -> Result<Response> {
    let doc = validate_body(&body, &CREATE_GROUP)?;
    let group = NewGroup {
        name: require_str(&doc, labels::GROUP_NAME)?.to_string(),
        members: optional_str_list(&doc, labels::GROUP_MEMBERS)?,
        parameters: optional_list(&doc, labels::GROUP_PARAMETERS)?,
    };
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .groups()
        .create_group(&user, &workflow_id, group)
        .await
        .map_err(|e| ApiError::from(e).unknown_user_as_invalid())?;
    Ok(response::created(doc))
}

async fn list_workflow_groups(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .groups()
        .list_groups(&user, Some(&workflow_id))
        .await?;
    Ok(response::ok(doc))
}

async fn list_groups(State(state): State<AppState>, token: AccessToken) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.groups().list_groups(&user, None).await?;
    Ok(response::ok(doc))
}

async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.groups().get_group(&user, &group_id).await?;
    Ok(response::ok(doc))
}

async fn update_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
    RawBody(body): RawBody,
) -> Result<Response> {
    let doc = validate_body(&body, &UPDATE_GROUP)?;
    let update = GroupUpdate {
        name: optional_str(&doc, labels::GROUP_NAME)?.map(str::to_string),
        members: optional_str_list(&doc, labels::GROUP_MEMBERS)?,
    };
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .groups()
        .update_group(&user, &group_id, update)
        .await
        .map_err(|e| ApiError::from(e).unknown_user_as_invalid())?;
    Ok(response::ok(doc))
}

async fn delete_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    session.groups().delete_group(&user, &group_id).await?;
    Ok(response::no_content())
}
