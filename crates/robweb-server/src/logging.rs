// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tracing setup.
//!
//! Two outputs: human readable logs on stdout filtered by `RUST_LOG`, and
//! an error log appended to `<log_dir>/webapi.log`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the error log file.
pub const LOG_FILE: &str = "webapi.log";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "robweb_server=info,robweb_service=info,tower_http=info";

/// Open (creating if needed) the error log file in `log_dir`.
pub fn open_log_file(log_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global subscriber. Returns the error log path.
pub fn init(log_dir: &Path) -> std::io::Result<PathBuf> {
    let (path, file) = open_log_file(log_dir)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout = fmt::layer().with_target(true).with_filter(env_filter);
    let error_file = fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .with_filter(LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(stdout)
        .with(error_file)
        .init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("log");
        let (path, _file) = open_log_file(&log_dir).unwrap();
        assert!(path.exists());
        assert_eq!(path, log_dir.join("webapi.log"));
    }
}
