// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! ROB Web API server
//!
//! Loads configuration from the environment, loads workflow specifications
//! from `<basedir>/workflows`, and serves the API until Ctrl-C.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use robweb_server::config::Config;
use robweb_server::{logging, run_server};
use robweb_service::MemoryBackend;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    let log_file = logging::init(&config.log_dir)?;

    info!("Starting ROB Web API");
    info!(
        bind_addr = %config.bind_addr,
        api_path = %config.api_path,
        base_dir = %config.base_dir.display(),
        max_content_length = config.max_content_length,
        log_file = %log_file.display(),
        "Configuration loaded"
    );

    if config.database_url.is_some() {
        warn!("ROB_DATABASE is set but this server runs the in-memory engine; the database is not used");
    }

    let backend = MemoryBackend::builder()
        .api_path(config.api_path.clone())
        .workflow_dir(config.workflow_dir())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to load workflows");
            e
        })?;
    info!(workflows = backend.workflow_count().await, "Engine initialized");

    run_server(config, Arc::new(backend)).await
}
