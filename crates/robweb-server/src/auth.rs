// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Access token extraction.
//!
//! The token travels in the `api_key` header. Routes that require a login
//! take [`AccessToken`]; routes where a login is optional take
//! `Option<AccessToken>`. The token is forwarded to the engine as is; this
//! layer never checks it.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::error::{ApiError, Result};

/// Header carrying the access token.
pub const HEADER_TOKEN: &str = "api_key";

/// Read the access token from the request headers.
///
/// A present header yields its value, even if empty. A missing header is
/// an `Unauthenticated` error when `required` is set, and `None` otherwise.
pub fn extract_token(headers: &HeaderMap, required: bool) -> Result<Option<String>> {
    match headers.get(HEADER_TOKEN) {
        Some(value) => Ok(Some(String::from_utf8_lossy(value.as_bytes()).into_owned())),
        None if required => Err(ApiError::unauthenticated()),
        None => Ok(None),
    }
}

/// Access token of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

impl AccessToken {
    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        match extract_token(&parts.headers, true)? {
            Some(token) => Ok(AccessToken(token)),
            None => Err(ApiError::unauthenticated()),
        }
    }
}

impl<S> OptionalFromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>> {
        Ok(extract_token(&parts.headers, false)?.map(AccessToken))
    }
}
