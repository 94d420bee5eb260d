// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Success responses: JSON documents and file downloads.

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio_util::io::ReaderStream;

use robweb_service::FileHandle;

use crate::error::{ApiError, Result};

/// JSON document with a status code.
pub fn json(status: StatusCode, doc: Value) -> Response {
    (status, Json(doc)).into_response()
}

/// 200 response.
pub fn ok(doc: Value) -> Response {
    json(StatusCode::OK, doc)
}

/// 201 response.
pub fn created(doc: Value) -> Response {
    json(StatusCode::CREATED, doc)
}

/// 204 response. The body is an empty JSON object.
pub fn no_content() -> Response {
    json(StatusCode::NO_CONTENT, json!({}))
}

/// Stream a file as an attachment.
pub fn file(handle: FileHandle) -> Result<Response> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, header_value(&handle.mime_type)?)
        .header(
            header::CONTENT_DISPOSITION,
            header_value(&content_disposition(&handle.name))?,
        );
    if let Some(ts) = handle.last_modified {
        let http_date = ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        builder = builder.header(header::LAST_MODIFIED, header_value(&http_date)?);
    }
    if let Some(size) = handle.size {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }
    let stream = ReaderStream::new(handle.into_reader());
    Ok(builder.body(Body::from_stream(stream))?)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(format!("invalid header: {e}")))
}

/// `attachment` disposition with a quoted file name.
pub fn content_disposition(name: &str) -> String {
    let escaped: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();
    format!("attachment; filename=\"{escaped}\"")
}

/// Reduce an uploaded file name to a safe relative name.
///
/// Path separators become underscores, characters outside
/// `[A-Za-z0-9._-]` are dropped and leading dots are stripped. The result
/// is empty if nothing usable remains.
pub fn secure_filename(name: &str) -> String {
    let joined: String = name
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let cleaned: String = joined
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_file_response_headers() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let handle = FileHandle::from_bytes("results/a.txt", "text/plain", Bytes::from_static(b"hi"))
            .with_last_modified(ts);
        let response = file(handle).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"results/a.txt\""
        );
        assert_eq!(headers[header::LAST_MODIFIED], "Tue, 05 Mar 2024 14:07:09 GMT");
        assert_eq!(headers[header::CONTENT_LENGTH], "2");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hi");
    }

    #[tokio::test]
    async fn test_no_content_body() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("names.txt"), "names.txt");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("my data file.csv"), "my_data_file.csv");
        assert_eq!(secure_filename("C:\\Users\\x\\a.json"), "C_Users_x_a.json");
        assert_eq!(secure_filename(".."), "");
        assert_eq!(secure_filename(""), "");
    }
}
