// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default URL prefix of the API.
pub const DEFAULT_API_PATH: &str = "/rob/api/v1";

/// Default base directory for engine data.
pub const DEFAULT_BASEDIR: &str = ".rob";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default maximum request body size (16 MiB).
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// ROB Web API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server address
    pub bind_addr: SocketAddr,
    /// URL prefix for all API routes (no trailing slash)
    pub api_path: String,
    /// Base directory for engine data
    pub base_dir: PathBuf,
    /// Database connection string handed to the engine
    pub database_url: Option<String>,
    /// Maximum request body size in bytes
    pub max_content_length: usize,
    /// Directory for the error log file
    pub log_dir: PathBuf,
    /// Directory with the static UI files, if the UI is served
    pub ui_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = PathBuf::from(DEFAULT_BASEDIR);
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            api_path: DEFAULT_API_PATH.to_string(),
            log_dir: absolute(&base_dir.join("log")),
            base_dir,
            database_url: None,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            ui_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `ROB_WEBAPI_PORT`: HTTP port (default: 5000)
    /// - `ROB_API_PATH`: URL prefix (default: /rob/api/v1)
    /// - `ROB_API_BASEDIR`: Base data directory (default: .rob)
    /// - `ROB_DATABASE`: Database connection string (default: unset)
    /// - `ROB_WEBAPI_CONTENTLENGTH`: Max request body in bytes (default: 16 MiB)
    /// - `ROB_WEBAPI_LOG`: Log directory (default: `<basedir>/log`)
    /// - `ROB_UI_PATH`: Static UI directory (default: UI disabled)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("ROB_WEBAPI_PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("ROB_WEBAPI_PORT", "must be a valid port number"))?;

        let api_path = std::env::var("ROB_API_PATH")
            .map(|p| normalize_api_path(&p))
            .unwrap_or_else(|_| DEFAULT_API_PATH.to_string());

        let base_dir = PathBuf::from(
            std::env::var("ROB_API_BASEDIR").unwrap_or_else(|_| DEFAULT_BASEDIR.to_string()),
        );

        let database_url = std::env::var("ROB_DATABASE").ok().filter(|s| !s.is_empty());

        let max_content_length: usize = match std::env::var("ROB_WEBAPI_CONTENTLENGTH") {
            Ok(value) => value.trim().parse().map_err(|_| {
                ConfigError::Invalid("ROB_WEBAPI_CONTENTLENGTH", "must be a positive integer")
            })?,
            Err(_) => DEFAULT_MAX_CONTENT_LENGTH,
        };

        let log_dir = std::env::var("ROB_WEBAPI_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir.join("log"));

        let ui_path = std::env::var("ROB_UI_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            api_path,
            base_dir,
            database_url,
            max_content_length,
            log_dir: absolute(&log_dir),
            ui_path,
        })
    }

    /// Override the URL prefix.
    pub fn with_api_path(mut self, path: &str) -> Self {
        self.api_path = normalize_api_path(path);
        self
    }

    /// Override the maximum request body size.
    pub fn with_max_content_length(mut self, bytes: usize) -> Self {
        self.max_content_length = bytes;
        self
    }

    /// Serve the static UI from a directory.
    pub fn with_ui_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ui_path = Some(path.into());
        self
    }

    /// Directory with workflow specification files.
    pub fn workflow_dir(&self) -> PathBuf {
        self.base_dir.join("workflows")
    }
}

/// Strip trailing slashes; an empty prefix mounts the API at the root.
fn normalize_api_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
