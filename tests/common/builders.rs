//! Test builders: documents, seeded stores, and an in-process HTTP client.
//!
//! These are written for readable assertions, not production use. They panic
//! on invalid input rather than returning `Result`.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use nutshell_core::query::DEFAULT_PAGE_SIZE;
use nutshell_core::types::Document;
use nutshell_core::SharedStore;
use nutshell_store::MemoryStore;
use nutshell_web::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Turn a `json!({...})` object into a [`Document`].
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("doc() needs a JSON object, got {other}"),
    }
}

pub fn customer_doc(name: &str) -> Document {
    doc(json!({ "type": "customer", "name": name }))
}

pub fn log_doc(name: &str, customer_id: &str) -> Document {
    doc(json!({ "type": "node_snapshot", "name": name, "customer_id": customer_id }))
}

pub fn cluster_doc(name: &str, customer_id: &str) -> Document {
    doc(json!({ "type": "cluster", "name": name, "customer_id": customer_id }))
}

// ---------------------------------------------------------------------------
// StoreBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for a populated [`MemoryStore`].
///
/// ```rust
/// let store = StoreBuilder::new()
///     .customer("c1", "Acme Corp")
///     .log("l1", "nightly", "c1")
///     .build();
/// ```
#[derive(Default)]
pub struct StoreBuilder {
    docs: Vec<(String, Document)>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(self, id: &str, name: &str) -> Self {
        self.document(id, customer_doc(name))
    }

    pub fn log(self, id: &str, name: &str, customer_id: &str) -> Self {
        self.document(id, log_doc(name, customer_id))
    }

    pub fn cluster(self, id: &str, name: &str, customer_id: &str) -> Self {
        self.document(id, cluster_doc(name, customer_id))
    }

    pub fn document(mut self, id: &str, doc: Document) -> Self {
        self.docs.push((id.to_string(), doc));
        self
    }

    pub fn build(self) -> MemoryStore {
        MemoryStore::from_documents(self.docs)
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(self.build())
    }
}

// ---------------------------------------------------------------------------
// In-process HTTP
// ---------------------------------------------------------------------------

/// Router over `store` with the default page size.
pub fn app(store: SharedStore) -> Router {
    let state = AppState::new(store, DEFAULT_PAGE_SIZE).expect("templates compile");
    nutshell_web::router(state)
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", self.body))
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION)
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(app: &Router, uri: &str, body: &str) -> TestResponse {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
