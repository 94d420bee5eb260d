// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Files uploaded to a group.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;

use super::MemoryHandle;
use super::store::{FileRecord, file_doc, new_id};
use crate::api::UploadService;
use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;
use crate::model::{FileHandle, UploadFile, UserRef, mime_type_for};

#[async_trait]
impl UploadService for MemoryHandle {
    async fn list_uploaded_files(&self, user: &UserRef, group_id: &str) -> Result<Value> {
        let store = self.store().await;
        let group = store.member_group(user, group_id)?;
        let files: Vec<Value> = group.uploads.iter().map(file_doc).collect();
        Ok(json!({ labels::FILE_LIST: files }))
    }

    async fn upload_file(
        &self,
        user: &UserRef,
        group_id: &str,
        file: UploadFile,
    ) -> Result<Value> {
        if file.name.trim().is_empty() {
            return Err(ServiceError::constraint("empty file name"));
        }
        let mut store = self.store().await;
        store.member_group(user, group_id)?;
        let mime_type = file
            .content_type
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| mime_type_for(&file.name).to_string());
        let record = FileRecord {
            id: new_id(),
            name: file.name,
            mime_type,
            data: file.data,
            created_at: Utc::now(),
        };
        let doc = file_doc(&record);
        debug!(group_id = %group_id, file_id = %record.id, size = record.data.len(), "File uploaded");
        store.group_mut(group_id)?.uploads.push(record);
        Ok(doc)
    }

    async fn get_uploaded_file(&self, group_id: &str, file_id: &str) -> Result<FileHandle> {
        let store = self.store().await;
        let group = store.group(group_id)?;
        let file = group
            .uploads
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::File, file_id))?;
        Ok(
            FileHandle::from_bytes(file.name.clone(), file.mime_type.clone(), file.data.clone())
                .with_last_modified(file.created_at),
        )
    }

    async fn delete_file(&self, user: &UserRef, group_id: &str, file_id: &str) -> Result<()> {
        let mut store = self.store().await;
        store.member_group(user, group_id)?;
        let group = store.group_mut(group_id)?;
        let before = group.uploads.len();
        group.uploads.retain(|f| f.id != file_id);
        if group.uploads.len() == before {
            return Err(ServiceError::unknown(ObjectKind::File, file_id));
        }
        debug!(group_id = %group_id, file_id = %file_id, "File deleted");
        Ok(())
    }
}
