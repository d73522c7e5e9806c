//! Shared helpers for driving the router in tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use k256::ecdsa::SigningKey;
use serde_json::Value;
use tower::ServiceExt;

use realty_auth_server::auth::{crypto::address_from_key, AuthService};
use realty_auth_server::middleware::RateLimiter;
use realty_auth_server::routes::build_router;
use realty_auth_server::state::AppState;
use realty_auth_server::store::{MemoryUserStore, UserStore};

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: MemoryUserStore,
}

pub fn service_for(store: Arc<dyn UserStore>) -> AuthService {
    AuthService::new(
        store,
        JWT_SECRET.to_string(),
        24 * 60 * 60,
        4,
        "Real Estate DApp".to_string(),
        Duration::from_millis(500),
    )
}

pub fn router_for(store: Arc<dyn UserStore>) -> Router {
    let state = AppState::new(Arc::new(service_for(store)));
    build_router(state, RateLimiter::new(10_000))
}

pub fn test_app() -> TestApp {
    let store = MemoryUserStore::new();
    TestApp {
        router: router_for(Arc::new(store.clone())),
        store,
    }
}

impl TestApp {
    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.router, Method::POST, uri, Some(body), None).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        send(&self.router, Method::GET, uri, None, token).await
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// POST a raw body, optionally without a content type
pub async fn send_raw(
    router: &Router,
    uri: &str,
    body: &str,
    content_type: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// A deterministic wallet for tests
pub fn wallet(seed: u8) -> (SigningKey, String) {
    let key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let address = address_from_key(key.verifying_key());
    (key, address)
}
