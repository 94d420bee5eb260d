// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! User registration, login and password reset.
//!
//! Registration, activation, login and the password reset pair are open.
//! Listing users, logout and whoami require a login.

use axum::Router;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};

use robweb_service::labels;
use robweb_service::routes::{
    USERS_ACTIVATE, USERS_LIST, USERS_LOGIN, USERS_LOGOUT, USERS_PASSWORD_REQUEST,
    USERS_PASSWORD_RESET, USERS_REGISTER, USERS_WHOAMI, full_path,
};

use crate::auth::AccessToken;
use crate::body::{FieldSpec, RawBody, require_str, truthy, validate_body};
use crate::error::Result;
use crate::query::{QueryParams, USER_QUERY};
use crate::response;
use crate::state::AppState;

/// Body of an activation request.
pub const ACTIVATE_USER: FieldSpec = FieldSpec::new(&[labels::USER_ID], &[]);

/// Body of a login request.
pub const LOGIN_USER: FieldSpec =
    FieldSpec::new(&[labels::USER_NAME, labels::USER_PASSWORD], &[]);

/// Body of a registration request.
pub const REGISTER_USER: FieldSpec = FieldSpec::new(
    &[labels::USER_NAME, labels::USER_PASSWORD],
    &[labels::USER_VERIFY],
);

/// Body of a password reset request.
pub const REQUEST_RESET: FieldSpec = FieldSpec::new(&[labels::USER_NAME], &[]);

/// Body of a password reset.
pub const RESET_PASSWORD: FieldSpec =
    FieldSpec::new(&[labels::USER_REQUEST_ID, labels::USER_PASSWORD], &[]);

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(&full_path(prefix, USERS_LIST), get(list_users))
        .route(&full_path(prefix, USERS_ACTIVATE), post(activate_user))
        .route(&full_path(prefix, USERS_LOGIN), post(login_user))
        .route(&full_path(prefix, USERS_LOGOUT), post(logout_user))
        .route(&full_path(prefix, USERS_REGISTER), post(register_user))
        .route(
            &full_path(prefix, USERS_PASSWORD_REQUEST),
            post(request_password_reset),
        )
        .route(&full_path(prefix, USERS_PASSWORD_RESET), post(reset_password))
        .route(&full_path(prefix, USERS_WHOAMI), get(whoami_user))
}

async fn list_users(
    State(state): State<AppState>,
    token: AccessToken,
    params: QueryParams,
) -> Result<Response> {
    let (session, _user) = state.authenticated(token.as_str()).await?;
    let doc = session.users().list_users(params.get(USER_QUERY)).await?;
    Ok(response::ok(doc))
}

async fn activate_user(State(state): State<AppState>, RawBody(body): RawBody) -> Result<Response> {
    let doc = validate_body(&body, &ACTIVATE_USER)?;
    let user_id = require_str(&doc, labels::USER_ID)?;
    let session = state.service().await?;
    let doc = session.users().activate_user(user_id).await?;
    Ok(response::ok(doc))
}

async fn login_user(State(state): State<AppState>, RawBody(body): RawBody) -> Result<Response> {
    let doc = validate_body(&body, &LOGIN_USER)?;
    let username = require_str(&doc, labels::USER_NAME)?;
    let password = require_str(&doc, labels::USER_PASSWORD)?;
    let session = state.service().await?;
    let doc = session.users().login_user(username, password).await?;
    Ok(response::ok(doc))
}

async fn logout_user(State(state): State<AppState>, token: AccessToken) -> Result<Response> {
    let (session, _user) = state.authenticated(token.as_str()).await?;
    let doc = session.users().logout_user(token.as_str()).await?;
    Ok(response::ok(doc))
}

async fn register_user(State(state): State<AppState>, RawBody(body): RawBody) -> Result<Response> {
    let doc = validate_body(&body, &REGISTER_USER)?;
    let username = require_str(&doc, labels::USER_NAME)?;
    let password = require_str(&doc, labels::USER_PASSWORD)?;
    let verify = doc.get(labels::USER_VERIFY).is_none_or(truthy);
    let session = state.service().await?;
    let doc = session
        .users()
        .register_user(username, password, verify)
        .await?;
    Ok(response::created(doc))
}

async fn request_password_reset(
    State(state): State<AppState>,
    RawBody(body): RawBody,
) -> Result<Response> {
    let doc = validate_body(&body, &REQUEST_RESET)?;
    let username = require_str(&doc, labels::USER_NAME)?;
    let session = state.service().await?;
    let doc = session.users().request_password_reset(username).await?;
    Ok(response::ok(doc))
}

async fn reset_password(State(state): State<AppState>, RawBody(body): RawBody) -> Result<Response> {
    let doc = validate_body(&body, &RESET_PASSWORD)?;
    let request_id = require_str(&doc, labels::USER_REQUEST_ID)?;
    let password = require_str(&doc, labels::USER_PASSWORD)?;
    let session = state.service().await?;
    let doc = session.users().reset_password(request_id, password).await?;
    Ok(response::ok(doc))
}

async fn whoami_user(State(state): State<AppState>, token: AccessToken) -> Result<Response> {
    let session = state.service().await?;
    let doc = session.users().whoami_user(token.as_str()).await?;
    Ok(response::ok(doc))
}
