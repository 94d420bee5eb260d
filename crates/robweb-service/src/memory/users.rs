// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! User registration, login and password reset.

use async_trait::async_trait;
use chrono::Utc;
use rand::RngCore;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use super::MemoryHandle;
use super::store::{ResetRecord, Store, TokenRecord, UserRecord, new_id};
use crate::api::UserService;
use crate::error::{ObjectKind, Result, ServiceError};
use crate::labels;

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

fn login_doc(store: &Store, user_id: &str, token: &str) -> Value {
    let mut doc = store.user_doc(user_id);
    if let Value::Object(map) = &mut doc {
        map.insert(labels::USER_TOKEN.into(), json!(token));
    }
    doc
}

#[async_trait]
impl UserService for MemoryHandle {
    async fn activate_user(&self, user_id: &str) -> Result<Value> {
        let mut store = self.store().await;
        let user = store
            .users
            .get_mut(user_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::User, user_id))?;
        user.active = true;
        Ok(store.user_doc(user_id))
    }

    async fn list_users(&self, query: Option<&str>) -> Result<Value> {
        let store = self.store().await;
        let mut users: Vec<&UserRecord> = store
            .users
            .values()
            .filter(|u| u.active)
            .filter(|u| query.is_none_or(|q| u.username.starts_with(q)))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        let docs: Vec<Value> = users.iter().map(|u| store.user_doc(&u.id)).collect();
        Ok(json!({ labels::USER_LIST: docs }))
    }

    async fn login_user(&self, username: &str, password: &str) -> Result<Value> {
        let mut store = self.store().await;
        let user_id = match store.user_by_name(username) {
            Some(user) if user.active && user.password_hash == hash_password(&user.salt, password) => {
                user.id.clone()
            }
            _ => return Err(ServiceError::unknown(ObjectKind::User, username)),
        };
        let now = Utc::now();
        store.prune_expired(now);
        let token = new_id();
        let expires_at = now + self.shared.config.token_ttl;
        store.tokens.insert(
            token.clone(),
            TokenRecord {
                user_id: user_id.clone(),
                expires_at,
            },
        );
        Ok(login_doc(&store, &user_id, &token))
    }

    async fn logout_user(&self, token: &str) -> Result<Value> {
        let mut store = self.store().await;
        let record = store
            .tokens
            .remove(token)
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(store.user_doc(&record.user_id))
    }

    async fn register_user(&self, username: &str, password: &str, verify: bool) -> Result<Value> {
        if username.trim().is_empty() {
            return Err(ServiceError::constraint("missing user name"));
        }
        if password.trim().is_empty() {
            return Err(ServiceError::constraint("empty password"));
        }
        let mut store = self.store().await;
        if store.user_by_name(username).is_some() {
            return Err(ServiceError::constraint(format!(
                "duplicate user '{username}'"
            )));
        }
        let salt = new_salt();
        let user = UserRecord {
            id: new_id(),
            username: username.to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            active: !verify,
        };
        let user_id = user.id.clone();
        store.users.insert(user_id.clone(), user);
        Ok(store.user_doc(&user_id))
    }

    async fn request_password_reset(&self, username: &str) -> Result<Value> {
        let mut store = self.store().await;
        let now = Utc::now();
        store.prune_expired(now);
        // Unknown names get an unrecorded request id, indistinguishable from
        // a real one.
        let request_id = new_id();
        let user_id = store.user_by_name(username).map(|u| u.id.clone());
        if let Some(user_id) = user_id {
            let expires_at = now + self.shared.config.reset_ttl;
            store
                .resets
                .insert(request_id.clone(), ResetRecord { user_id, expires_at });
        }
        Ok(json!({ labels::USER_REQUEST_ID: request_id }))
    }

    async fn reset_password(&self, request_id: &str, password: &str) -> Result<Value> {
        if password.trim().is_empty() {
            return Err(ServiceError::constraint("empty password"));
        }
        let mut store = self.store().await;
        let now = Utc::now();
        let user_id = store
            .resets
            .remove(request_id)
            .filter(|r| r.expires_at > now)
            .map(|r| r.user_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::Request, request_id))?;
        let user = store
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::unknown(ObjectKind::User, &user_id))?;
        user.salt = new_salt();
        user.password_hash = hash_password(&user.salt, password);
        store.tokens.retain(|_, t| t.user_id != user_id);
        Ok(store.user_doc(&user_id))
    }

    async fn whoami_user(&self, token: &str) -> Result<Value> {
        let store = self.store().await;
        let user_id = store
            .user_for_token(token, Utc::now())
            .map(|u| u.id.clone())
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(login_doc(&store, &user_id, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServiceFactory;
    use crate::memory::MemoryBackend;
    use chrono::Duration;

    #[test]
    fn test_hash_password_depends_on_salt() {
        let a = hash_password("aa", "secret");
        let b = hash_password("bb", "secret");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("aa", "secret"));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_reset_for_unknown_user_is_not_stored() {
        let backend = MemoryBackend::new();
        let session = backend.connect().await.unwrap();
        for i in 0..100 {
            let doc = session
                .users()
                .request_password_reset(&format!("ghost{i}"))
                .await
                .unwrap();
            assert!(doc[labels::USER_REQUEST_ID].is_string());
        }
        assert!(backend.shared.store.lock().await.resets.is_empty());

        let doc = session.users().request_password_reset("ghost0").await.unwrap();
        let request_id = doc[labels::USER_REQUEST_ID].as_str().unwrap();
        let err = session.users().reset_password(request_id, "new").await.unwrap_err();
        assert!(err.is_unknown(ObjectKind::Request));
    }

    #[tokio::test]
    async fn test_expired_reset_request_is_rejected() {
        let backend = MemoryBackend::builder()
            .reset_ttl(Duration::zero())
            .build()
            .unwrap();
        let session = backend.connect().await.unwrap();
        session.users().register_user("alice", "pwd", false).await.unwrap();

        let doc = session.users().request_password_reset("alice").await.unwrap();
        let request_id = doc[labels::USER_REQUEST_ID].as_str().unwrap();
        let err = session.users().reset_password(request_id, "new").await.unwrap_err();
        assert!(err.is_unknown(ObjectKind::Request));

        // The old password still works.
        session.users().login_user("alice", "pwd").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_records_are_pruned() {
        let backend = MemoryBackend::builder()
            .token_ttl(Duration::zero())
            .reset_ttl(Duration::zero())
            .build()
            .unwrap();
        let session = backend.connect().await.unwrap();
        session.users().register_user("alice", "pwd", false).await.unwrap();

        for _ in 0..50 {
            session.users().login_user("alice", "pwd").await.unwrap();
            session.users().request_password_reset("alice").await.unwrap();
        }

        // Each insert drops every record that expired before it.
        let store = backend.shared.store.lock().await;
        assert!(store.tokens.len() <= 2, "tokens = {}", store.tokens.len());
        assert!(store.resets.len() <= 2, "resets = {}", store.resets.len());
    }
}
