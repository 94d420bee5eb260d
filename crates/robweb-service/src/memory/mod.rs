// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory benchmark engine.
//!
//! A process-local implementation of the service interface. Runs do not
//! execute anything: they stay active until a driver calls
//! [`MemoryBackend::complete_run`] or [`MemoryBackend::fail_run`], which
//! makes the engine suitable for tests and for running the server without
//! an external engine.
//!
//! ```ignore
//! let backend = MemoryBackend::builder()
//!     .api_path("/rob/api/v1")
//!     .workflow_dir(".rob/workflows")
//!     .build()?;
//! let session = backend.connect().await?;
//! let doc = session.workflows().list_workflows().await?;
//! ```

mod archive;
mod groups;
mod ranking;
mod runs;
mod store;
mod uploads;
mod users;
mod workflows;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{
    GroupService, RunService, ServerService, ServiceFactory, ServiceHandle, UploadService,
    UserService, WorkflowService,
};
use crate::error::{Result, ServiceError};
use crate::labels;
use crate::model::{UserRef, mime_type_for};
use crate::routes::{ROUTES, full_path};
use crate::session::Session;

use store::{FileRecord, RunState, Store, WorkflowRecord, new_id};

/// Default service name reported by the descriptor.
pub const DEFAULT_SERVICE_NAME: &str = "Reproducible Open Benchmarks for Data Analysis (API)";

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Default lifetime of a password reset request.
pub const DEFAULT_RESET_TTL_HOURS: i64 = 1;

struct MemoryConfig {
    service_name: String,
    api_path: String,
    token_ttl: Duration,
    reset_ttl: Duration,
}

struct Shared {
    config: MemoryConfig,
    store: Mutex<Store>,
    open_sessions: AtomicUsize,
}

/// In-memory engine. Cloning yields another reference to the same state.
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty engine with default settings.
    pub fn new() -> Self {
        Self::with_store(
            MemoryConfig {
                service_name: DEFAULT_SERVICE_NAME.to_string(),
                api_path: String::new(),
                token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
                reset_ttl: Duration::hours(DEFAULT_RESET_TTL_HOURS),
            },
            Store::default(),
        )
    }

    /// Create a builder.
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder::default()
    }

    fn with_store(config: MemoryConfig, store: Store) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                store: Mutex::new(store),
                open_sessions: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of sessions that have been opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.shared.open_sessions.load(Ordering::SeqCst)
    }

    /// Number of workflows currently registered.
    pub async fn workflow_count(&self) -> usize {
        self.shared.store.lock().await.workflows.len()
    }

    /// Register a workflow from a JSON specification and return its id.
    ///
    /// The specification needs a `name`; `id`, `description`,
    /// `instructions`, `parameters` and `schema` are optional.
    pub async fn create_workflow(&self, spec: Value) -> Result<String> {
        let workflow = workflow_from_spec(&spec)?;
        let mut store = self.shared.store.lock().await;
        insert_workflow(&mut store, workflow)
    }

    /// Mark an active run as successful with its result values and files.
    pub async fn complete_run(
        &self,
        run_id: &str,
        results: Value,
        files: Vec<(String, Bytes)>,
    ) -> Result<()> {
        let Value::Object(results) = results else {
            return Err(ServiceError::constraint("run results must be an object"));
        };
        let mut store = self.shared.store.lock().await;
        let run = active_run(&mut store, run_id)?;
        let now = Utc::now();
        run.state = RunState::Success;
        run.finished_at = Some(now);
        run.results = Some(results);
        run.files = files.into_iter().map(|(name, data)| file_record(name, data)).collect();
        debug!(run_id = %run_id, "Run completed");
        Ok(())
    }

    /// Mark an active run as failed with error messages.
    pub async fn fail_run(&self, run_id: &str, messages: Vec<String>) -> Result<()> {
        let mut store = self.shared.store.lock().await;
        let run = active_run(&mut store, run_id)?;
        run.state = RunState::Error;
        run.finished_at = Some(Utc::now());
        run.messages = messages;
        debug!(run_id = %run_id, "Run failed");
        Ok(())
    }

    /// Replace the post-processing result files of a workflow.
    pub async fn publish_resources(
        &self,
        workflow_id: &str,
        files: Vec<(String, Bytes)>,
    ) -> Result<()> {
        let mut store = self.shared.store.lock().await;
        let workflow = store.workflow_mut(workflow_id)?;
        workflow.postproc = files.into_iter().map(|(name, data)| file_record(name, data)).collect();
        workflow.postproc_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl ServiceFactory for MemoryBackend {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> Result<Session> {
        let open = self.shared.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open_sessions = open, "Session opened");
        Ok(Session::new(Box::new(MemoryHandle {
            shared: self.shared.clone(),
            closed: false,
        })))
    }
}

/// Builder for [`MemoryBackend`].
pub struct MemoryBackendBuilder {
    service_name: String,
    api_path: String,
    token_ttl: Duration,
    reset_ttl: Duration,
    workflow_dir: Option<PathBuf>,
}

impl Default for MemoryBackendBuilder {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            api_path: String::new(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            reset_ttl: Duration::hours(DEFAULT_RESET_TTL_HOURS),
            workflow_dir: None,
        }
    }
}

impl MemoryBackendBuilder {
    /// Service name reported by the descriptor.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// URL prefix used for the route table in the descriptor.
    pub fn api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into();
        self
    }

    /// Lifetime of issued access tokens.
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Lifetime of password reset requests.
    pub fn reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    /// Directory with `*.json` workflow specifications to load at startup.
    /// A missing directory is skipped.
    pub fn workflow_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workflow_dir = Some(dir.into());
        self
    }

    /// Build the engine, loading workflow specifications if configured.
    pub fn build(self) -> Result<MemoryBackend> {
        let mut store = Store::default();
        if let Some(dir) = &self.workflow_dir {
            load_workflows(&mut store, dir)?;
        }
        Ok(MemoryBackend::with_store(
            MemoryConfig {
                service_name: self.service_name,
                api_path: self.api_path,
                token_ttl: self.token_ttl,
                reset_ttl: self.reset_ttl,
            },
            store,
        ))
    }
}

fn load_workflows(store: &mut Store, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Workflow directory not found, no workflows loaded");
        return Ok(());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let spec: Value = serde_json::from_str(&content).map_err(|e| {
            ServiceError::Internal(format!("invalid workflow file {}: {}", path.display(), e))
        })?;
        let workflow_id = insert_workflow(store, workflow_from_spec(&spec)?)?;
        info!(workflow_id = %workflow_id, path = %path.display(), "Workflow loaded");
    }
    Ok(())
}

fn workflow_from_spec(spec: &Value) -> Result<WorkflowRecord> {
    let name = spec
        .get(labels::NAME)
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ServiceError::constraint("workflow name missing"))?;
    let text = |key: &str| spec.get(key).and_then(Value::as_str).map(str::to_string);
    let list = |key: &str| -> Result<Vec<Value>> {
        match spec.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(ServiceError::constraint(format!("workflow {key} not a list"))),
        }
    };
    Ok(WorkflowRecord {
        id: text(labels::ID).unwrap_or_else(new_id),
        name: name.to_string(),
        description: text(labels::DESCRIPTION),
        instructions: text(labels::INSTRUCTIONS),
        parameters: list(labels::WORKFLOW_PARAMETERS)?,
        schema: list(labels::WORKFLOW_SCHEMA)?,
        postproc: Vec::new(),
        postproc_at: None,
    })
}

fn insert_workflow(store: &mut Store, workflow: WorkflowRecord) -> Result<String> {
    if store.workflows.iter().any(|w| w.id == workflow.id) {
        return Err(ServiceError::constraint(format!(
            "duplicate workflow '{}'",
            workflow.id
        )));
    }
    if store.workflows.iter().any(|w| w.name == workflow.name) {
        return Err(ServiceError::constraint(format!(
            "workflow '{}' exists",
            workflow.name
        )));
    }
    let id = workflow.id.clone();
    store.workflows.push(workflow);
    Ok(id)
}

fn active_run<'a>(store: &'a mut Store, run_id: &str) -> Result<&'a mut store::RunRecord> {
    let run = store.run_mut(run_id)?;
    if !run.state.is_active() {
        return Err(ServiceError::constraint(format!(
            "invalid run state '{}'",
            run.state.as_str()
        )));
    }
    Ok(run)
}

fn file_record(name: String, data: Bytes) -> FileRecord {
    FileRecord {
        id: new_id(),
        mime_type: mime_type_for(&name).to_string(),
        name,
        data,
        created_at: Utc::now(),
    }
}

// ============================================================================
// Session handle
// ============================================================================

/// Session of the in-memory engine.
pub struct MemoryHandle {
    shared: Arc<Shared>,
    closed: bool,
}

impl MemoryHandle {
    pub(crate) async fn store(&self) -> tokio::sync::MutexGuard<'_, Store> {
        self.shared.store.lock().await
    }
}

#[async_trait]
impl ServiceHandle for MemoryHandle {
    async fn authenticate(&self, token: &str) -> Result<UserRef> {
        let store = self.store().await;
        store
            .user_for_token(token, Utc::now())
            .map(|u| u.to_ref())
            .ok_or(ServiceError::Unauthenticated)
    }

    fn server(&self) -> &dyn ServerService {
        self
    }

    fn users(&self) -> &dyn UserService {
        self
    }

    fn workflows(&self) -> &dyn WorkflowService {
        self
    }

    fn groups(&self) -> &dyn GroupService {
        self
    }

    fn runs(&self) -> &dyn RunService {
        self
    }

    fn uploads(&self) -> &dyn UploadService {
        self
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let open = self.shared.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
            debug!(open_sessions = open, "Session closed");
        }
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl ServerService for MemoryHandle {
    async fn service_descriptor(&self, token: Option<&str>) -> Result<Value> {
        let store = self.store().await;
        let user = token.and_then(|t| store.user_for_token(t, Utc::now()));
        let config = &self.shared.config;
        let routes: Vec<Value> = ROUTES
            .iter()
            .map(|r| {
                json!({
                    labels::ROUTE_ACTION: r.action,
                    labels::ROUTE_PATTERN: full_path(&config.api_path, r.pattern),
                })
            })
            .collect();
        let mut doc = json!({
            labels::SERVICE_NAME: config.service_name,
            labels::SERVICE_VERSION: env!("CARGO_PKG_VERSION"),
            labels::SERVICE_VALID_TOKEN: user.is_some(),
            labels::SERVICE_ROUTES: routes,
        });
        if let (Some(user), Value::Object(map)) = (user, &mut doc) {
            map.insert(labels::SERVICE_USERNAME.into(), json!(user.username));
        }
        Ok(doc)
    }
}
