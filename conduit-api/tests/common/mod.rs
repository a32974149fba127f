/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store so every test starts
/// from an empty database without external services.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use conduit_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use conduit_shared::{auth::Credentials, store::memory::MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router
pub struct TestContext {
    pub app: Router,
}

impl TestContext {
    /// Creates a router over a fresh in-memory store
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
                ttl_hours: 24,
            },
        };
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Credentials::new(SECRET),
            config,
        );

        Self {
            app: build_router(state),
        }
    }

    /// Sends a request and returns the status and decoded JSON body
    /// (`Value::Null` for an empty or non-JSON body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Registers `username` and returns its session token
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "user": {
                        "username": username,
                        "email": format!("{username}@example.com"),
                        "password": "password123",
                    }
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["user"]["token"].as_str().unwrap().to_string()
    }

    /// Publishes an article and returns its slug
    pub async fn publish(&self, token: &str, title: &str, tags: &[&str]) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/articles",
                Some(token),
                Some(json!({
                    "article": {
                        "title": title,
                        "description": "description",
                        "body": "body",
                        "tagList": tags,
                    }
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "publish failed: {body}");
        body["article"]["slug"].as_str().unwrap().to_string()
    }
}
