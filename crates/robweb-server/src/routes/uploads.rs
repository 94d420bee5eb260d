// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Files uploaded to a group.
//!
//! Listing, uploading and deleting require a login. Downloading does not;
//! group and file identifiers are unguessable.

use axum::Router;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;

use robweb_service::UploadFile;
use robweb_service::routes::{UPLOADS_FILE, UPLOADS_FILES, full_path};

use crate::auth::AccessToken;
use crate::error::{ApiError, Result};
use crate::response::{self, secure_filename};
use crate::state::AppState;

/// Name of the multipart part carrying the file.
pub const FILE_PART: &str = "file";

pub(crate) fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &full_path(prefix, UPLOADS_FILES),
            get(list_files).post(upload_file),
        )
        .route(
            &full_path(prefix, UPLOADS_FILE),
            get(download_file).delete(delete_file),
        )
}

async fn list_files(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session
        .uploads()
        .list_uploaded_files(&user, &group_id)
        .await?;
    Ok(response::ok(doc))
}

async fn upload_file(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    token: AccessToken,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let mut multipart = multipart.map_err(|e| ApiError::invalid(e.body_text()))?;
    let file = read_file_part(&mut multipart).await?;
    let (session, user) = state.authenticated(token.as_str()).await?;
    let doc = session.uploads().upload_file(&user, &group_id, file).await?;
    Ok(response::created(doc))
}

/// Read the `file` part of a multipart body.
async fn read_file_part(multipart: &mut Multipart) -> Result<UploadFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_PART) {
            continue;
        }
        let name = secure_filename(field.file_name().unwrap_or_default());
        if name.is_empty() {
            return Err(ApiError::invalid("empty file name"));
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadFile {
            name,
            content_type,
            data,
        });
    }
    Err(ApiError::invalid("no file request"))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::UploadTooLarge(e.body_text())
    } else {
        ApiError::invalid(e.body_text())
    }
}

async fn download_file(
    State(state): State<AppState>,
    Path((group_id, file_id)): Path<(String, String)>,
) -> Result<Response> {
    let session = state.service().await?;
    let handle = session
        .uploads()
        .get_uploaded_file(&group_id, &file_id)
        .await?;
    response::file(handle)
}

async fn delete_file(
    State(state): State<AppState>,
    Path((group_id, file_id)): Path<(String, String)>,
    token: AccessToken,
) -> Result<Response> {
    let (session, user) = state.authenticated(token.as_str()).await?;
    session
        .uploads()
        .delete_file(&user, &group_id, &file_id)
        .await?;
    Ok(response::no_content())
}
