// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! User groups (benchmark submissions).

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::MemoryHandle;
use super::store::{GroupRecord, Store, new_id};
use crate::api::GroupService;
use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;
use crate::model::{GroupUpdate, NewGroup, UserRef};

/// Deduplicated member list; every member must be a registered user.
fn resolve_members(store: &Store, members: &[String], owner: Option<&str>) -> Result<Vec<String>> {
    let mut resolved: Vec<String> = Vec::new();
    for member in owner.into_iter().chain(members.iter().map(String::as_str)) {
        if !store.users.contains_key(member) {
            return Err(ServiceError::unknown(ObjectKind::User, member));
        }
        if !resolved.iter().any(|m| m == member) {
            resolved.push(member.to_string());
        }
    }
    Ok(resolved)
}

fn check_name(store: &Store, workflow_id: &str, name: &str, except: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::constraint("empty group name"));
    }
    let taken = store.groups.values().any(|g| {
        g.workflow_id == workflow_id && g.name == name && except.is_none_or(|id| g.id != id)
    });
    if taken {
        return Err(ServiceError::constraint(format!("group '{name}' exists")));
    }
    Ok(())
}

#[async_trait]
impl GroupService for MemoryHandle {
    async fn create_group(
        &self,
        user: &UserRef,
        workflow_id: &str,
        group: NewGroup,
    ) -> Result<Value> {
        let mut store = self.store().await;
        store.workflow(workflow_id)?;
        check_name(&store, workflow_id, &group.name, None)?;
        let members = resolve_members(
            &store,
            group.members.as_deref().unwrap_or_default(),
            Some(user.user_id.as_str()),
        )?;
        let record = GroupRecord {
            id: new_id(),
            workflow_id: workflow_id.to_string(),
            name: group.name,
            members,
            parameters: group.parameters.unwrap_or_default(),
            uploads: Vec::new(),
        };
        let group_id = record.id.clone();
        store.groups.insert(group_id.clone(), record);
        debug!(group_id = %group_id, workflow_id = %workflow_id, "Group created");
        let group = store.group(&group_id)?;
        Ok(store.group_doc(group))
    }

    async fn list_groups(&self, user: &UserRef, workflow_id: Option<&str>) -> Result<Value> {
        let store = self.store().await;
        if let Some(workflow_id) = workflow_id {
            store.workflow(workflow_id)?;
        }
        let docs: Vec<Value> = store
            .user_groups(&user.user_id, workflow_id)
            .map(|g| store.group_summary(g))
            .collect();
        Ok(json!({ labels::GROUP_LIST: docs }))
    }

    async fn get_group(&self, _user: &UserRef, group_id: &str) -> Result<Value> {
        let store = self.store().await;
        let group = store.group(group_id)?;
        Ok(store.group_doc(group))
    }

    async fn update_group(
        &self,
        user: &UserRef,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<Value> {
        let mut store = self.store().await;
        let group = store.member_group(user, group_id)?;
        if update.is_empty() {
            return Ok(store.group_doc(group));
        }
        let workflow_id = group.workflow_id.clone();
        if let Some(name) = &update.name {
            check_name(&store, &workflow_id, name, Some(group_id))?;
        }
        let members = match &update.members {
            Some(members) => Some(resolve_members(&store, members, None)?),
            None => None,
        };
        let group = store.group_mut(group_id)?;
        if let Some(name) = update.name {
            group.name = name;
        }
        if let Some(members) = members {
            group.members = members;
        }
        let group = store.group(group_id)?;
        Ok(store.group_doc(group))
    }

    async fn delete_group(&self, user: &UserRef, group_id: &str) -> Result<()> {
        let mut store = self.store().await;
        store.member_group(user, group_id)?;
        if let Some(run) = store
            .runs
            .iter()
            .find(|r| r.group_id == group_id && r.state.is_active())
        {
            return Err(ServiceError::constraint(format!(
                "group has active run '{}'",
                run.id
            )));
        }
        store.groups.remove(group_id);
        store.runs.retain(|r| r.group_id != group_id);
        debug!(group_id = %group_id, "Group deleted");
        Ok(())
    }
}
