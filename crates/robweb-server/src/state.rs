// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared application state.

use std::sync::Arc;

use tracing::error;

use robweb_service::{ServiceFactory, Session, UserRef};

use crate::config::Config;
use crate::error::{ApiError, Result};

/// State handed to every route handler. Built once at startup and never
/// mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,
    backend: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Create the state from a configuration and an engine.
    pub fn new(config: Config, backend: Arc<dyn ServiceFactory>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// Open a session with the engine for the current request.
    ///
    /// The session is released when the returned guard is dropped.
    pub async fn service(&self) -> Result<Session> {
        self.backend.connect().await.map_err(|e| {
            error!(backend = self.backend.backend_type(), error = %e, "Failed to open service session");
            ApiError::from(e)
        })
    }

    /// Open a session and resolve the access token to a user.
    pub async fn authenticated(&self, token: &str) -> Result<(Session, UserRef)> {
        let session = self.service().await?;
        let user = session.authenticate(token).await?;
        Ok((session, user))
    }
}
