// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Static files of the browser UI.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

/// Mount point of the UI.
pub const UI_PREFIX: &str = "/rob-ui";

/// Serve the UI directory. Unknown paths fall back to `index.html` so
/// client-side routes resolve.
pub(crate) fn routes(ui_path: &Path) -> Router<AppState> {
    let index = ServeFile::new(ui_path.join("index.html"));
    let files = ServeDir::new(ui_path)
        .append_index_html_on_directories(true)
        .fallback(index);
    Router::new().nest_service(UI_PREFIX, files)
}
