// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Static UI directory.

mod common;

use axum::http::StatusCode;

use common::{API, TestContext};
use robweb_server::Config;

#[tokio::test]
async fn test_ui_serves_files_and_index_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>rob</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

    let ctx = TestContext::with_config(Config::default().with_ui_path(dir.path())).await;

    let response = ctx.get("/rob-ui/app.js", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"console.log(1);");

    let response = ctx.get("/rob-ui/", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"<html>rob</html>");

    // Client-side routes resolve to the index page.
    let response = ctx.get("/rob-ui/workflows/helloworld", None).await;
    assert_eq!(response.body, b"<html>rob</html>");

    // The API is still mounted.
    let response = ctx.get(&format!("{API}/workflows"), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_ui_disabled_by_default() {
    let ctx = TestContext::new().await;
    let response = ctx.get("/rob-ui/", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
