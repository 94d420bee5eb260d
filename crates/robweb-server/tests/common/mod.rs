// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for the HTTP API tests.
//!
//! Provides TestContext with an in-memory engine and the assembled router.
//! Requests are dispatched in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use robweb_server::{AppState, Config, router};
use robweb_service::MemoryBackend;

/// URL prefix used by the tests.
pub const API: &str = "/rob/api/v1";

/// Boundary of multipart bodies built by [`multipart_body`].
pub const BOUNDARY: &str = "robweb-test-boundary";

/// Test context holding the engine and the router.
pub struct TestContext {
    pub backend: MemoryBackend,
    pub app: Router,
}

/// A collected response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON; an empty body is `null`.
    pub fn json(&self) -> Value {
        if self.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&self.body).expect("response body is not JSON")
        }
    }

    /// Value of a response header.
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Specification of the workflow every context starts with.
pub fn hello_world() -> Value {
    json!({
        "id": "helloworld",
        "name": "Hello World",
        "description": "Say hello",
        "parameters": [
            {"name": "names", "type": "file"},
            {"name": "greeting", "type": "string"},
            {"name": "sleeptime", "type": "int"}
        ],
        "schema": [
            {"id": "avg_count", "name": "Avg. Chars", "type": "decimal"},
            {"id": "max_len", "name": "Max. Output", "type": "int"}
        ]
    })
}

impl TestContext {
    /// Context with the default configuration.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Context with a custom configuration.
    pub async fn with_config(config: Config) -> Self {
        let backend = MemoryBackend::builder()
            .api_path(config.api_path.clone())
            .build()
            .expect("Failed to build backend");
        Self::with_backend(config, backend).await
    }

    /// Context with a custom configuration and engine.
    pub async fn with_backend(config: Config, backend: MemoryBackend) -> Self {
        backend
            .create_workflow(hello_world())
            .await
            .expect("Failed to create workflow");
        let app = router(AppState::new(config, Arc::new(backend.clone())));
        Self { backend, app }
    }

    /// Send a request with an optional token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("api_key", token);
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("Failed to build request"))
            .await
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET with an optional token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    /// POST a JSON body with an optional token.
    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register an active user and return its access token.
    pub async fn register_and_login(&self, username: &str) -> String {
        let response = self
            .post(
                &format!("{API}/users/register"),
                None,
                json!({"username": username, "password": "pwd", "verify": false}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        let response = self
            .post(
                &format!("{API}/users/login"),
                None,
                json!({"username": username, "password": "pwd"}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["token"]
            .as_str()
            .expect("login returns a token")
            .to_string()
    }

    /// Create a group for the hello world workflow and return its id.
    pub async fn create_group(&self, token: &str, name: &str) -> String {
        let response = self
            .post(
                &format!("{API}/workflows/helloworld/groups"),
                Some(token),
                json!({"name": name}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"]
            .as_str()
            .expect("group has an id")
            .to_string()
    }

    /// Start a run without arguments and return its id.
    pub async fn start_run(&self, token: &str, group_id: &str) -> String {
        let response = self
            .post(
                &format!("{API}/groups/{group_id}/runs"),
                Some(token),
                json!({"arguments": []}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"]
            .as_str()
            .expect("run has an id")
            .to_string()
    }
}

/// Build a multipart/form-data body with one file part.
pub fn multipart_body(part: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{part}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build an upload request for a multipart body.
pub fn upload_request(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("api_key", token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("Failed to build request")
}
