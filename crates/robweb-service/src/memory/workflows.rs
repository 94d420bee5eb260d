// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow listing, leaderboards and post-processing resources.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::MemoryHandle;
use super::archive::{ARCHIVE_MIME_TYPE, tar_files};
use super::ranking::{RankingEntry, rank};
use super::store::{RunState, timestamp};
use crate::api::WorkflowService;
use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;
use crate::model::{FileHandle, RankingQuery, UserRef};

/// File name of the post-processing archive.
pub(crate) const RESULTS_ARCHIVE: &str = "results.tar.gz";

#[async_trait]
impl WorkflowService for MemoryHandle {
    async fn list_workflows(&self) -> Result<Value> {
        let store = self.store().await;
        let docs: Vec<Value> = store
            .workflows
            .iter()
            .map(|w| store.workflow_summary(w))
            .collect();
        Ok(json!({ labels::WORKFLOW_LIST: docs }))
    }

    async fn get_workflow(&self, workflow_id: &str, user: Option<&UserRef>) -> Result<Value> {
        let store = self.store().await;
        let workflow = store.workflow(workflow_id)?;
        Ok(store.workflow_doc(workflow, user))
    }

    async fn get_ranking(&self, workflow_id: &str, query: &RankingQuery) -> Result<Value> {
        let store = self.store().await;
        let workflow = store.workflow(workflow_id)?;
        let entries: Vec<RankingEntry> = store
            .runs
            .iter()
            .filter(|r| r.workflow_id == workflow_id && r.state == RunState::Success)
            .map(|r| RankingEntry {
                run_id: r.id.clone(),
                group_id: r.group_id.clone(),
                finished_at: r.finished_at,
                results: r.results.clone().unwrap_or_default(),
            })
            .collect();
        let ranked = rank(&workflow.column_ids(), entries, query)?;

        let ranking: Vec<Value> = ranked
            .iter()
            .filter_map(|entry| {
                let run = store.run(&entry.run_id).ok()?;
                let group_name = store
                    .groups
                    .get(&entry.group_id)
                    .map(|g| g.name.clone())
                    .unwrap_or_default();
                let results: Vec<Value> = workflow
                    .column_ids()
                    .iter()
                    .filter_map(|col| {
                        entry
                            .results
                            .get(col)
                            .map(|v| json!({ labels::COLUMN_ID: col, labels::ARG_VALUE: v }))
                    })
                    .collect();
                Some(json!({
                    labels::RUN_ID: run.id,
                    labels::RUN_GROUP: {
                        labels::GROUP_ID: entry.group_id,
                        labels::GROUP_NAME: group_name,
                    },
                    labels::RUN_CREATED_AT: timestamp(&run.created_at),
                    labels::RUN_STARTED_AT: run.started_at.as_ref().map(timestamp),
                    labels::RUN_FINISHED_AT: run.finished_at.as_ref().map(timestamp),
                    labels::RUN_RESULTS: results,
                }))
            })
            .collect();

        let mut doc = json!({
            labels::WORKFLOW_SCHEMA: workflow.schema,
            labels::RANKING: ranking,
        });
        if let (Some(postproc), Value::Object(map)) = (store.postproc_doc(workflow), &mut doc) {
            map.insert(labels::WORKFLOW_POSTPROC.into(), postproc);
        }
        Ok(doc)
    }

    async fn get_result_archive(&self, workflow_id: &str) -> Result<FileHandle> {
        let store = self.store().await;
        let workflow = store.workflow(workflow_id)?;
        let Some(created_at) = workflow.postproc_at else {
            return Err(ServiceError::unknown(ObjectKind::File, RESULTS_ARCHIVE));
        };
        let data = tar_files(&workflow.postproc)?;
        Ok(FileHandle::from_bytes(RESULTS_ARCHIVE, ARCHIVE_MIME_TYPE, data)
            .with_last_modified(created_at))
    }

    async fn get_result_file(&self, workflow_id: &str, file_id: &str) -> Result<FileHandle> {
        let store = self.store().await;
        let workflow = store.workflow(workflow_id)?;
        let file = workflow
            .postproc
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::File, file_id))?;
        Ok(
            FileHandle::from_bytes(file.name.clone(), file.mime_type.clone(), file.data.clone())
                .with_last_modified(file.created_at),
        )
    }
}
