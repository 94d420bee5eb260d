// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow routes: listing, handles, leaderboards and downloads.

mod common;

use axum::http::{StatusCode, header};
use bytes::Bytes;
use serde_json::json;

use common::{API, TestContext};

/// Two groups with one successful run each. Returns (run of A, run of B).
async fn ranked_runs(ctx: &TestContext) -> (String, String) {
    let alice = ctx.register_and_login("alice").await;
    let bob = ctx.register_and_login("bob").await;
    let group_a = ctx.create_group(&alice, "A").await;
    let group_b = ctx.create_group(&bob, "B").await;
    let run_a = ctx.start_run(&alice, &group_a).await;
    let run_b = ctx.start_run(&bob, &group_b).await;
    ctx.backend
        .complete_run(&run_a, json!({"avg_count": 1.5, "max_len": 20}), vec![])
        .await
        .unwrap();
    ctx.backend
        .complete_run(&run_b, json!({"avg_count": 3.0, "max_len": 10}), vec![])
        .await
        .unwrap();
    (run_a, run_b)
}

fn ranking_ids(doc: &serde_json::Value) -> Vec<String> {
    doc["ranking"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_and_get_workflow() {
    let ctx = TestContext::new().await;

    let response = ctx.get(&format!("{API}/workflows"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["workflows"][0]["id"], json!("helloworld"));

    let response = ctx.get(&format!("{API}/workflows/helloworld"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let doc = response.json();
    assert_eq!(doc["name"], json!("Hello World"));
    assert!(doc.get("groups").is_none());

    let token = ctx.register_and_login("alice").await;
    ctx.create_group(&token, "A").await;
    let doc = ctx
        .get(&format!("{API}/workflows/helloworld"), Some(&token))
        .await
        .json();
    assert_eq!(doc["groups"][0]["name"], json!("A"));

    let response = ctx
        .get(&format!("{API}/workflows/helloworld"), Some("bad-token"))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx.get(&format!("{API}/workflows/unknown"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_ordering() {
    let ctx = TestContext::new().await;
    let (run_a, run_b) = ranked_runs(&ctx).await;

    let response = ctx
        .get(&format!("{API}/workflows/helloworld/leaderboard"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ranking_ids(&response.json()), vec![run_b.clone(), run_a.clone()]);

    let doc = ctx
        .get(
            &format!("{API}/workflows/helloworld/leaderboard?orderBy=avg_count:asc"),
            None,
        )
        .await
        .json();
    assert_eq!(ranking_ids(&doc), vec![run_a.clone(), run_b.clone()]);

    let doc = ctx
        .get(
            &format!("{API}/workflows/helloworld/leaderboard?orderBy=max_len:desc,avg_count"),
            None,
        )
        .await
        .json();
    assert_eq!(ranking_ids(&doc), vec![run_a, run_b]);

    let response = ctx
        .get(
            &format!("{API}/workflows/helloworld/leaderboard?orderBy=unknown"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_include_all() {
    let ctx = TestContext::new().await;
    let alice = ctx.register_and_login("alice").await;
    let group = ctx.create_group(&alice, "A").await;
    for score in [1.0, 2.0] {
        let run = ctx.start_run(&alice, &group).await;
        ctx.backend
            .complete_run(&run, json!({"avg_count": score, "max_len": 1}), vec![])
            .await
            .unwrap();
    }

    let uri = format!("{API}/workflows/helloworld/leaderboard");
    let doc = ctx.get(&uri, None).await.json();
    assert_eq!(doc["ranking"].as_array().unwrap().len(), 1);

    let doc = ctx.get(&format!("{uri}?includeAll=true"), None).await.json();
    assert_eq!(doc["ranking"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_postproc_downloads() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get(&format!("{API}/workflows/helloworld/downloads/archive"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    ctx.backend
        .publish_resources(
            "helloworld",
            vec![("compare.json".into(), Bytes::from_static(b"[1, 2]"))],
        )
        .await
        .unwrap();

    let doc = ctx.get(&format!("{API}/workflows/helloworld"), None).await.json();
    let file_id = doc["postproc"]["files"][0]["id"].as_str().unwrap().to_string();

    let response = ctx
        .get(
            &format!("{API}/workflows/helloworld/downloads/files/{file_id}"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("application/json"));
    assert_eq!(response.body, b"[1, 2]");

    let response = ctx
        .get(&format!("{API}/workflows/helloworld/downloads/archive"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("application/gzip"));
    let disposition = response.header(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.contains("results.tar.gz"), "{disposition}");
}
