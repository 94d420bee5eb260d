// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed values passed from the HTTP layer into service calls.
//!
//! Domain entities themselves (workflows, groups, runs, users, files) are
//! returned as opaque JSON documents; only the request-side shapes are typed.

use std::fmt;
use std::io::Cursor;
use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncRead;

/// Identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Unique user identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
}

/// One sort directive of a leaderboard query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    /// Result schema column identifier.
    pub column_id: String,
    /// Sort descending (the default) or ascending.
    pub sort_desc: bool,
}

impl SortColumn {
    /// Descending sort on a column.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            sort_desc: true,
        }
    }

    /// Ascending sort on a column.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            sort_desc: false,
        }
    }
}

/// Leaderboard query options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingQuery {
    /// Sort directives; `None` uses the workflow's default order.
    pub order_by: Option<Vec<SortColumn>>,
    /// Include every successful run instead of the best run per group.
    pub include_all: bool,
}

/// Arguments for creating a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewGroup {
    /// Unique group name within the workflow.
    pub name: String,
    /// Additional member user identifiers (the creator is always a member).
    pub members: Option<Vec<String>>,
    /// Additional template parameter declarations.
    pub parameters: Option<Vec<Value>>,
}

/// Arguments for updating a group. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    /// New group name.
    pub name: Option<String>,
    /// New member list.
    pub members: Option<Vec<String>>,
}

impl GroupUpdate {
    /// True if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.members.is_none()
    }
}

/// A file received by the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Sanitized file name.
    pub name: String,
    /// Content type sent by the client, if any.
    pub content_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// A downloadable file produced by the service.
///
/// The content is consumed by streaming the reader; the handle does not
/// buffer it.
pub struct FileHandle {
    /// File name used in the `Content-Disposition` header.
    pub name: String,
    /// Mime type of the content.
    pub mime_type: String,
    /// Modification timestamp, if known.
    pub last_modified: Option<DateTime<Utc>>,
    /// Content length in bytes, if known.
    pub size: Option<u64>,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl FileHandle {
    /// Create a handle that streams from an arbitrary reader.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        reader: impl AsyncRead + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            last_modified: None,
            size: None,
            reader: Box::pin(reader),
        }
    }

    /// Create a handle over in-memory content.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        let size = data.len() as u64;
        let mut handle = Self::new(name, mime_type, Cursor::new(data));
        handle.size = Some(size);
        handle
    }

    /// Set the modification timestamp.
    pub fn with_last_modified(mut self, timestamp: DateTime<Utc>) -> Self {
        self.last_modified = Some(timestamp);
        self
    }

    /// Consume the handle and return the content reader.
    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send>> {
        self.reader
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("last_modified", &self.last_modified)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Guess a mime type from a file name extension.
pub fn mime_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "json" => "application/json",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "tar" => "application/x-tar",
        "gz" | "tgz" => "application/gzip",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
