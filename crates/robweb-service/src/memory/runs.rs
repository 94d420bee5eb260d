// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow runs.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;

use super::MemoryHandle;
use super::archive::{ARCHIVE_MIME_TYPE, tar_files};
use super::store::{RunRecord, RunState, new_id};
use crate::api::RunService;
use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;
use crate::model::{FileHandle, UserRef};

/// File name of a run result archive.
pub(crate) const RUN_ARCHIVE: &str = "run.tar.gz";

/// Message recorded when a run is canceled without a reason.
pub(crate) const DEFAULT_CANCEL_MESSAGE: &str = "canceled at user request";

fn parameter_names<'a>(declarations: impl Iterator<Item = &'a Value>) -> Vec<&'a str> {
    declarations
        .filter_map(|p| p.get(labels::ARG_ID).and_then(Value::as_str))
        .collect()
}

fn successful_run<'a>(run: &'a RunRecord) -> Result<&'a RunRecord> {
    if run.state != RunState::Success {
        return Err(ServiceError::unknown(ObjectKind::File, RUN_ARCHIVE));
    }
    Ok(run)
}

#[async_trait]
impl RunService for MemoryHandle {
    async fn start_run(
        &self,
        user: &UserRef,
        group_id: &str,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let mut store = self.store().await;
        let group = store.member_group(user, group_id)?;
        let workflow = store.workflow(&group.workflow_id)?;
        let declared = parameter_names(workflow.parameters.iter().chain(group.parameters.iter()));
        for arg in &arguments {
            let name = arg
                .get(labels::ARG_ID)
                .and_then(Value::as_str)
                .ok_or_else(|| ServiceError::constraint("invalid argument"))?;
            if !declared.contains(&name) {
                return Err(ServiceError::UnknownParameter(name.to_string()));
            }
        }
        let now = Utc::now();
        let run = RunRecord {
            id: new_id(),
            group_id: group.id.clone(),
            workflow_id: group.workflow_id.clone(),
            state: RunState::Running,
            arguments,
            created_at: now,
            started_at: Some(now),
            finished_at: None,
            messages: Vec::new(),
            results: None,
            files: Vec::new(),
        };
        debug!(run_id = %run.id, group_id = %group_id, "Run started");
        let doc = store.run_doc(&run);
        store.runs.push(run);
        Ok(doc)
    }

    async fn list_runs(&self, user: &UserRef, group_id: &str) -> Result<Value> {
        let store = self.store().await;
        store.member_group(user, group_id)?;
        let docs: Vec<Value> = store
            .runs
            .iter()
            .filter(|r| r.group_id == group_id)
            .map(|r| store.run_summary(r))
            .collect();
        Ok(json!({ labels::RUN_LIST: docs }))
    }

    async fn poll_runs(
        &self,
        user: &UserRef,
        group_id: &str,
        state: Option<&str>,
    ) -> Result<Value> {
        let filter = match state {
            Some(s) => Some(
                RunState::parse(s)
                    .ok_or_else(|| ServiceError::constraint(format!("unknown run state '{s}'")))?,
            ),
            None => None,
        };
        let store = self.store().await;
        store.member_group(user, group_id)?;
        let ids: Vec<&str> = store
            .runs
            .iter()
            .filter(|r| r.group_id == group_id)
            .filter(|r| match filter {
                Some(state) => r.state == state,
                None => r.state.is_active(),
            })
            .map(|r| r.id.as_str())
            .collect();
        Ok(json!({ labels::RUN_LIST: ids }))
    }

    async fn get_run(&self, user: &UserRef, run_id: &str) -> Result<Value> {
        let store = self.store().await;
        let run = store.member_run(user, run_id)?;
        Ok(store.run_doc(run))
    }

    async fn cancel_run(
        &self,
        user: &UserRef,
        run_id: &str,
        reason: Option<&str>,
    ) -> Result<Value> {
        let mut store = self.store().await;
        let run = store.member_run(user, run_id)?;
        if !run.state.is_active() {
            return Err(ServiceError::constraint(format!(
                "invalid run state '{}'",
                run.state.as_str()
            )));
        }
        let run = store.run_mut(run_id)?;
        run.state = RunState::Canceled;
        run.finished_at = Some(Utc::now());
        run.messages = vec![reason.unwrap_or(DEFAULT_CANCEL_MESSAGE).to_string()];
        debug!(run_id = %run_id, "Run canceled");
        let run = store.run(run_id)?;
        Ok(store.run_doc(run))
    }

    async fn delete_run(&self, user: &UserRef, run_id: &str) -> Result<()> {
        let mut store = self.store().await;
        let run = store.member_run(user, run_id)?;
        if run.state.is_active() {
            return Err(ServiceError::constraint(format!(
                "invalid run state '{}'",
                run.state.as_str()
            )));
        }
        store.runs.retain(|r| r.id != run_id);
        debug!(run_id = %run_id, "Run deleted");
        Ok(())
    }

    async fn get_result_archive(&self, run_id: &str) -> Result<FileHandle> {
        let store = self.store().await;
        let run = successful_run(store.run(run_id)?)?;
        let data = tar_files(&run.files)?;
        let mut handle = FileHandle::from_bytes(RUN_ARCHIVE, ARCHIVE_MIME_TYPE, data);
        if let Some(finished_at) = run.finished_at {
            handle = handle.with_last_modified(finished_at);
        }
        Ok(handle)
    }

    async fn get_result_file(&self, run_id: &str, file_id: &str) -> Result<FileHandle> {
        let store = self.store().await;
        let run = successful_run(store.run(run_id)?)?;
        let file = run
            .files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::File, file_id))?;
        Ok(
            FileHandle::from_bytes(file.name.clone(), file.mime_type.clone(), file.data.clone())
                .with_last_modified(file.created_at),
        )
    }
}
