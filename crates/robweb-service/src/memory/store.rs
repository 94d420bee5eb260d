// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Records held by the in-memory engine and their JSON serialization.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;
use crate::model::UserRef;

/// Run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Pending,
    Running,
    Canceled,
    Error,
    Success,
}

impl RunState {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            RunState::Pending => "pending",
            RunState::Running => "running",
            RunState::Canceled => "canceled",
            RunState::Error => "error",
            RunState::Success => "success",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(RunState::Pending),
            "running" => Some(RunState::Running),
            "canceled" => Some(RunState::Canceled),
            "error" => Some(RunState::Error),
            "success" => Some(RunState::Success),
            _ => None,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self, RunState::Pending | RunState::Running)
    }
}

pub(crate) struct UserRecord {
    pub id: String,
    pub username: String,
    pub salt: String,
    pub password_hash: String,
    pub active: bool,
}

impl UserRecord {
    pub(crate) fn to_ref(&self) -> UserRef {
        UserRef {
            user_id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

pub(crate) struct TokenRecord {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

pub(crate) struct ResetRecord {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub(crate) struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub data: Bytes,
    pub created_at: DateTime<Utc>,
}

pub(crate) struct WorkflowRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub parameters: Vec<Value>,
    pub schema: Vec<Value>,
    pub postproc: Vec<FileRecord>,
    pub postproc_at: Option<DateTime<Utc>>,
}

impl WorkflowRecord {
    /// Column identifiers of the result schema, in declaration order.
    pub(crate) fn column_ids(&self) -> Vec<String> {
        self.schema
            .iter()
            .filter_map(|c| c.get(labels::COLUMN_ID).and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

pub(crate) struct GroupRecord {
    pub id: String,
    pub workflow_id: String,
    pub name: String,
    pub members: Vec<String>,
    pub parameters: Vec<Value>,
    pub uploads: Vec<FileRecord>,
}

impl GroupRecord {
    pub(crate) fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

pub(crate) struct RunRecord {
    pub id: String,
    pub group_id: String,
    pub workflow_id: String,
    pub state: RunState,
    pub arguments: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub messages: Vec<String>,
    pub results: Option<Map<String, Value>>,
    pub files: Vec<FileRecord>,
}

/// Complete engine state, guarded by a single mutex.
#[derive(Default)]
pub(crate) struct Store {
    pub users: HashMap<String, UserRecord>,
    pub tokens: HashMap<String, TokenRecord>,
    pub resets: HashMap<String, ResetRecord>,
    pub workflows: Vec<WorkflowRecord>,
    pub groups: HashMap<String, GroupRecord>,
    pub runs: Vec<RunRecord>,
}

impl Store {
    pub(crate) fn user_by_name(&self, username: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.username == username)
    }

    /// Drop expired access tokens and reset requests.
    pub(crate) fn prune_expired(&mut self, now: DateTime<Utc>) {
        self.tokens.retain(|_, t| t.expires_at > now);
        self.resets.retain(|_, r| r.expires_at > now);
    }

    pub(crate) fn user_for_token(&self, token: &str, now: DateTime<Utc>) -> Option<&UserRecord> {
        let record = self.tokens.get(token)?;
        if record.expires_at <= now {
            return None;
        }
        self.users.get(&record.user_id).filter(|u| u.active)
    }

    pub(crate) fn workflow(&self, workflow_id: &str) -> Result<&WorkflowRecord> {
        self.workflows
            .iter()
            .find(|w| w.id == workflow_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Workflow, workflow_id))
    }

    pub(crate) fn workflow_mut(&mut self, workflow_id: &str) -> Result<&mut WorkflowRecord> {
        self.workflows
            .iter_mut()
            .find(|w| w.id == workflow_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Workflow, workflow_id))
    }

    pub(crate) fn group(&self, group_id: &str) -> Result<&GroupRecord> {
        self.groups
            .get(group_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Group, group_id))
    }

    pub(crate) fn group_mut(&mut self, group_id: &str) -> Result<&mut GroupRecord> {
        self.groups
            .get_mut(group_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Group, group_id))
    }

    /// Group the user is a member of.
    pub(crate) fn member_group(&self, user: &UserRef, group_id: &str) -> Result<&GroupRecord> {
        let group = self.group(group_id)?;
        if !group.is_member(&user.user_id) {
            return Err(ServiceError::unauthorized(format!(
                "user '{}' is not a member of group '{}'",
                user.username, group_id
            )));
        }
        Ok(group)
    }

    pub(crate) fn run(&self, run_id: &str) -> Result<&RunRecord> {
        self.runs
            .iter()
            .find(|r| r.id == run_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Run, run_id))
    }

    pub(crate) fn run_mut(&mut self, run_id: &str) -> Result<&mut RunRecord> {
        self.runs
            .iter_mut()
            .find(|r| r.id == run_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Run, run_id))
    }

    /// Run of a group the user is a member of.
    pub(crate) fn member_run(&self, user: &UserRef, run_id: &str) -> Result<&RunRecord> {
        let run = self.run(run_id)?;
        self.member_group(user, &run.group_id)?;
        Ok(run)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    pub(crate) fn user_doc(&self, user_id: &str) -> Value {
        match self.users.get(user_id) {
            Some(user) => json!({
                labels::USER_ID: user.id,
                labels::USER_NAME: user.username,
            }),
            None => json!({ labels::USER_ID: user_id }),
        }
    }

    pub(crate) fn workflow_summary(&self, workflow: &WorkflowRecord) -> Value {
        let mut doc = Map::new();
        doc.insert(labels::ID.into(), json!(workflow.id));
        doc.insert(labels::NAME.into(), json!(workflow.name));
        if let Some(description) = &workflow.description {
            doc.insert(labels::DESCRIPTION.into(), json!(description));
        }
        if let Some(instructions) = &workflow.instructions {
            doc.insert(labels::INSTRUCTIONS.into(), json!(instructions));
        }
        Value::Object(doc)
    }

    pub(crate) fn workflow_doc(&self, workflow: &WorkflowRecord, user: Option<&UserRef>) -> Value {
        let mut doc = match self.workflow_summary(workflow) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        doc.insert(
            labels::WORKFLOW_PARAMETERS.into(),
            Value::Array(workflow.parameters.clone()),
        );
        doc.insert(
            labels::WORKFLOW_SCHEMA.into(),
            Value::Array(workflow.schema.clone()),
        );
        if let Some(postproc) = self.postproc_doc(workflow) {
            doc.insert(labels::WORKFLOW_POSTPROC.into(), postproc);
        }
        if let Some(user) = user {
            let groups: Vec<Value> = self
                .user_groups(&user.user_id, Some(&workflow.id))
                .map(|g| self.group_summary(g))
                .collect();
            doc.insert(labels::WORKFLOW_GROUPS.into(), Value::Array(groups));
        }
        Value::Object(doc)
    }

    pub(crate) fn postproc_doc(&self, workflow: &WorkflowRecord) -> Option<Value> {
        let created_at = workflow.postproc_at?;
        Some(json!({
            labels::RUN_STATE: RunState::Success.as_str(),
            labels::RUN_CREATED_AT: timestamp(&created_at),
            labels::FILE_LIST: workflow.postproc.iter().map(file_ref).collect::<Vec<_>>(),
        }))
    }

    pub(crate) fn user_groups<'a>(
        &'a self,
        user_id: &'a str,
        workflow_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a GroupRecord> + 'a {
        let mut groups: Vec<&GroupRecord> = self
            .groups
            .values()
            .filter(move |g| g.is_member(user_id))
            .filter(move |g| workflow_id.is_none_or(|w| g.workflow_id == w))
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups.into_iter()
    }

    pub(crate) fn group_summary(&self, group: &GroupRecord) -> Value {
        json!({
            labels::GROUP_ID: group.id,
            labels::GROUP_NAME: group.name,
            labels::GROUP_WORKFLOW: group.workflow_id,
            labels::GROUP_MEMBERS: group
                .members
                .iter()
                .map(|m| self.user_doc(m))
                .collect::<Vec<_>>(),
        })
    }

    pub(crate) fn group_doc(&self, group: &GroupRecord) -> Value {
        let mut parameters = self
            .workflow(&group.workflow_id)
            .map(|w| w.parameters.clone())
            .unwrap_or_default();
        parameters.extend(group.parameters.iter().cloned());
        let mut doc = match self.group_summary(group) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        doc.insert(labels::GROUP_PARAMETERS.into(), Value::Array(parameters));
        doc.insert(
            labels::GROUP_UPLOADS.into(),
            Value::Array(group.uploads.iter().map(file_doc).collect()),
        );
        Value::Object(doc)
    }

    pub(crate) fn run_summary(&self, run: &RunRecord) -> Value {
        let mut doc = Map::new();
        doc.insert(labels::RUN_ID.into(), json!(run.id));
        doc.insert(labels::RUN_STATE.into(), json!(run.state.as_str()));
        doc.insert(labels::RUN_CREATED_AT.into(), json!(timestamp(&run.created_at)));
        if let Some(started_at) = &run.started_at {
            doc.insert(labels::RUN_STARTED_AT.into(), json!(timestamp(started_at)));
        }
        if let Some(finished_at) = &run.finished_at {
            doc.insert(labels::RUN_FINISHED_AT.into(), json!(timestamp(finished_at)));
        }
        Value::Object(doc)
    }

    pub(crate) fn run_doc(&self, run: &RunRecord) -> Value {
        let mut doc = match self.run_summary(run) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let group_name = self
            .groups
            .get(&run.group_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();
        doc.insert(
            labels::RUN_GROUP.into(),
            json!({ labels::GROUP_ID: run.group_id, labels::GROUP_NAME: group_name }),
        );
        doc.insert(labels::RUN_ARGUMENTS.into(), Value::Array(run.arguments.clone()));
        match run.state {
            RunState::Canceled | RunState::Error => {
                doc.insert(labels::RUN_MESSAGES.into(), json!(run.messages));
            }
            RunState::Success => {
                doc.insert(
                    labels::RUN_FILES.into(),
                    Value::Array(run.files.iter().map(file_ref).collect()),
                );
            }
            RunState::Pending | RunState::Running => {}
        }
        Value::Object(doc)
    }
}

/// File identifier and name.
pub(crate) fn file_ref(file: &FileRecord) -> Value {
    json!({ labels::FILE_ID: file.id, labels::FILE_NAME: file.name })
}

/// Uploaded file descriptor.
pub(crate) fn file_doc(file: &FileRecord) -> Value {
    json!({
        labels::FILE_ID: file.id,
        labels::FILE_NAME: file.name,
        labels::FILE_CREATED_AT: timestamp(&file.created_at),
        labels::FILE_SIZE: file.data.len(),
    })
}

/// ISO 8601 timestamp with microsecond precision.
pub(crate) fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// New unique identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
