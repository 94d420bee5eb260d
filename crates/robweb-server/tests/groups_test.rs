// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Group routes over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{API, TestContext};

#[tokio::test]
async fn test_group_routes_require_token() {
    let ctx = TestContext::new().await;
    let uri = format!("{API}/workflows/helloworld/groups");

    let response = ctx.post(&uri, None, json!({"name": "A"})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx.post(&uri, Some("invalid"), json!({"name": "A"})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx.get(&format!("{API}/groups"), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_group_lifecycle() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice").await;

    let response = ctx
        .post(
            &format!("{API}/workflows/helloworld/groups"),
            Some(&token),
            json!({"name": "A", "parameters": [{"name": "extra", "type": "string"}]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    let group_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["workflow"], json!("helloworld"));
    assert_eq!(created["members"][0]["username"], json!("alice"));

    let uri = format!("{API}/groups/{group_id}");
    let response = ctx.get(&uri, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["id"], json!(group_id));

    let response = ctx
        .request(Method::PUT, &uri, Some(&token), Some(json!({"name": "Renamed"})))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], json!("Renamed"));

    let listing = ctx.get(&format!("{API}/groups"), Some(&token)).await.json();
    assert_eq!(listing["groups"][0]["name"], json!("Renamed"));
    let listing = ctx
        .get(&format!("{API}/workflows/helloworld/groups"), Some(&token))
        .await
        .json();
    assert_eq!(listing["groups"].as_array().unwrap().len(), 1);

    let response = ctx.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = ctx.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_group_validation() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice").await;
    let uri = format!("{API}/workflows/helloworld/groups");

    let response = ctx
        .post(&uri, Some(&token), json!({"name": "A", "members": "bob"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post(&uri, Some(&token), json!({"name": "A", "owner": "bob"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx.post(&uri, Some(&token), json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Unknown members are a bad request, not a missing resource.
    let response = ctx
        .post(&uri, Some(&token), json!({"name": "A", "members": ["no-such-user"]}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    ctx.create_group(&token, "A").await;
    let response = ctx.post(&uri, Some(&token), json!({"name": "A"})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .post(
            &format!("{API}/workflows/unknown/groups"),
            Some(&token),
            json!({"name": "B"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_members_modify_group() {
    let ctx = TestContext::new().await;
    let alice = ctx.register_and_login("alice").await;
    let bob = ctx.register_and_login("bob").await;
    let group_id = ctx.create_group(&alice, "A").await;
    let uri = format!("{API}/groups/{group_id}");

    let response = ctx
        .request(Method::PUT, &uri, Some(&bob), Some(json!({"name": "Mine"})))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = ctx.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Reading a group is open to every logged in user.
    let response = ctx.get(&uri, Some(&bob)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_group_with_active_run() {
    let ctx = TestContext::new().await;
    let token = ctx.register_and_login("alice").await;
    let group_id = ctx.create_group(&token, "A").await;
    ctx.start_run(&token, &group_id).await;

    let response = ctx
        .request(
            Method::DELETE,
            &format!("{API}/groups/{group_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
