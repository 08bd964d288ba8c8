//! Fake CouchDB server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves the subset of the CouchDB API that `CouchStore` uses:
//! - `PUT /{db}`: create a database (`412` if it exists)
//! - `POST /{db}/_all_docs`: fetch by `keys`, optionally with `include_docs`
//! - `POST /{db}/_bulk_docs`: write one or more docs with revision checks
//! - `POST /{db}/_design/{design}/_view/{view}`: the standard indexes,
//!   evaluated in Rust rather than from the installed map functions
//!
//! Every request is recorded so tests can check methods, paths and the
//! `Authorization` header.
//!
//! # Example
//!
//! ```rust,no_run
//! let couch = FakeCouch::start().await.unwrap();
//! couch.insert("c1", customer_doc("Acme Corp")).await;
//! let store = CouchStore::new(&couch.store_config("nutshell"));
//! ```

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};
use nutshell_core::config::{Backend, StoreConfig};
use nutshell_core::types::{Document, STANDARD_INDEXES};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

/// Stored revision counter plus body without `_id`/`_rev`.
type Stored = (u64, Document);

#[derive(Default)]
struct CouchState {
    databases: BTreeSet<String>,
    docs: BTreeMap<String, Stored>,
    requests: Vec<RecordedRequest>,
}

impl CouchState {
    fn record(&mut self, method: Method, path: String, headers: &HeaderMap) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.push(RecordedRequest {
            method,
            path,
            authorization,
        });
    }
}

/// Handle to the running fake CouchDB server.
pub struct FakeCouch {
    addr: SocketAddr,
    state: Arc<Mutex<CouchState>>,
}

impl FakeCouch {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(CouchState::default()));

        let app = Router::new()
            .route("/{db}", put(create_database))
            .route("/{db}/_all_docs", post(all_docs))
            .route("/{db}/_bulk_docs", post(bulk_docs))
            .route("/{db}/_design/{design}/_view/{view}", post(view))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the server (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Store config pointing at this server, anonymous.
    pub fn store_config(&self, database: &str) -> StoreConfig {
        StoreConfig {
            backend: Backend::CouchDb,
            url: self.base_url(),
            database: database.to_string(),
            ..StoreConfig::default()
        }
    }

    /// Put a document in place directly, bypassing revision checks.
    pub async fn insert(&self, id: &str, doc: Document) {
        let mut state = self.state.lock().await;
        let rev = state.docs.get(id).map_or(1, |(rev, _)| rev + 1);
        state.docs.insert(id.to_string(), (rev, doc));
    }

    /// Stored body of `id`, without CouchDB metadata.
    pub async fn document(&self, id: &str) -> Option<Document> {
        self.state.lock().await.docs.get(id).map(|(_, doc)| doc.clone())
    }

    pub async fn revision(&self, id: &str) -> Option<u64> {
        self.state.lock().await.docs.get(id).map(|(rev, _)| *rev)
    }

    pub async fn document_ids(&self) -> Vec<String> {
        self.state.lock().await.docs.keys().cloned().collect()
    }

    pub async fn has_database(&self, name: &str) -> bool {
        self.state.lock().await.databases.contains(name)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

type Shared = State<Arc<Mutex<CouchState>>>;

fn rev_string(rev: u64) -> String {
    format!("{rev}-fake")
}

fn with_meta(id: &str, rev: u64, doc: &Document) -> Value {
    let mut full = doc.clone();
    full.insert("_id".into(), json!(id));
    full.insert("_rev".into(), json!(rev_string(rev)));
    Value::Object(full)
}

async fn create_database(
    State(state): Shared,
    Path(db): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.record(Method::PUT, format!("/{db}"), &headers);
    if state.databases.insert(db) {
        (StatusCode::CREATED, Json(json!({ "ok": true })))
    } else {
        (
            StatusCode::PRECONDITION_FAILED,
            Json(json!({ "error": "file_exists" })),
        )
    }
}

#[derive(Deserialize)]
struct AllDocsParams {
    #[serde(default)]
    include_docs: bool,
}

#[derive(Deserialize)]
struct KeysBody {
    keys: Vec<String>,
}

async fn all_docs(
    State(state): Shared,
    Path(db): Path<String>,
    Query(params): Query<AllDocsParams>,
    headers: HeaderMap,
    Json(body): Json<KeysBody>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.record(Method::POST, format!("/{db}/_all_docs"), &headers);
    let rows: Vec<Value> = body
        .keys
        .iter()
        .map(|key| match state.docs.get(key) {
            Some((rev, doc)) => {
                let mut row = json!({
                    "id": key,
                    "key": key,
                    "value": { "rev": rev_string(*rev) },
                });
                if params.include_docs {
                    row["doc"] = with_meta(key, *rev, doc);
                }
                row
            }
            None => json!({ "key": key, "error": "not_found" }),
        })
        .collect();
    Json(json!({ "total_rows": state.docs.len(), "rows": rows }))
}

#[derive(Deserialize)]
struct BulkBody {
    docs: Vec<Document>,
}

async fn bulk_docs(
    State(state): Shared,
    Path(db): Path<String>,
    headers: HeaderMap,
    Json(body): Json<BulkBody>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.record(Method::POST, format!("/{db}/_bulk_docs"), &headers);

    let mut results = Vec::new();
    for mut doc in body.docs {
        let id = match doc.remove("_id") {
            Some(Value::String(id)) => id,
            _ => {
                results.push(json!({ "error": "bad_request", "reason": "missing _id" }));
                continue;
            }
        };
        let rev = doc.remove("_rev").and_then(|v| v.as_str().map(str::to_string));
        let deleted = doc.remove("_deleted") == Some(Value::Bool(true));
        let current = state.docs.get(&id).map(|(n, _)| *n);

        let next = match (current, rev) {
            (Some(n), Some(given)) if given == rev_string(n) => n + 1,
            (None, None) if !deleted => 1,
            _ => {
                results.push(json!({
                    "id": id,
                    "error": "conflict",
                    "reason": "Document update conflict.",
                }));
                continue;
            }
        };

        if deleted {
            state.docs.remove(&id);
        } else {
            state.docs.insert(id.clone(), (next, doc));
        }
        results.push(json!({ "ok": true, "id": id, "rev": rev_string(next) }));
    }
    (StatusCode::CREATED, Json(Value::Array(results)))
}

#[derive(Deserialize)]
struct ViewBody {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    startkey: Option<String>,
    #[serde(default)]
    endkey: Option<String>,
    #[serde(default = "default_true")]
    inclusive_end: bool,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    include_docs: bool,
}

fn default_true() -> bool {
    true
}

async fn view(
    State(state): Shared,
    Path((db, design, view)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<ViewBody>,
) -> axum::response::Response {
    let mut state = state.lock().await;
    state.record(
        Method::POST,
        format!("/{db}/_design/{design}/_view/{view}"),
        &headers,
    );

    let Some(def) = STANDARD_INDEXES
        .iter()
        .find(|d| d.name.design == design && d.name.view == view)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "reason": "missing_named_view" })),
        )
            .into_response();
    };

    let mut rows: Vec<(&str, &String, u64, &Document)> = state
        .docs
        .iter()
        .filter_map(|(id, (rev, doc))| def.emit(doc).map(|key| (key, id, *rev, doc)))
        .filter(|(key, ..)| {
            let key = *key;
            body.key.as_deref().map_or(true, |k| key == k)
                && body.startkey.as_deref().map_or(true, |s| key >= s)
                && body.endkey.as_deref().map_or(true, |e| {
                    if body.inclusive_end {
                        key <= e
                    } else {
                        key < e
                    }
                })
        })
        .collect();
    rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    if let Some(limit) = body.limit {
        rows.truncate(limit);
    }

    let rows: Vec<Value> = rows
        .into_iter()
        .map(|(key, id, rev, doc)| {
            let mut row = json!({ "id": id, "key": key, "value": null });
            if body.include_docs {
                row["doc"] = with_meta(id, rev, doc);
            }
            row
        })
        .collect();
    Json(json!({ "total_rows": rows.len(), "offset": 0, "rows": rows })).into_response()
}
