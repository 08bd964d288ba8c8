//! CouchDB backend over plain HTTP (hyper).
//!
//! Every call is a JSON `POST`, so document ids and key bounds travel in
//! request bodies and never need URL escaping:
//!
//! | Operation   | Endpoint                                   |
//! |-------------|--------------------------------------------|
//! | get / multi | `POST /{db}/_all_docs?include_docs=true`   |
//! | add / set   | `POST /{db}/_bulk_docs`                    |
//! | delete      | `POST /{db}/_bulk_docs` with `_deleted`    |
//! | query       | `POST /{db}/_design/{d}/_view/{v}`         |
//!
//! CouchDB stores `_id` and `_rev` inside documents; both are stripped before
//! documents leave this module. Revisions are looked up right before a write.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use nutshell_core::config::StoreConfig;
use nutshell_core::error::{Error, Result, StoreError};
use nutshell_core::query::{KeyRange, QueryBounds};
use nutshell_core::store::{DocumentStore, Fetched};
use nutshell_core::types::{Document, IndexDefinition, IndexName, IndexRow};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

pub struct CouchStore {
    client: Client<HttpConnector, Full<Bytes>>,
    /// `{url}/{database}`, no trailing slash.
    db_url: String,
    auth: Option<HeaderValue>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RowsResponse<R> {
    rows: Vec<R>,
}

/// One `_all_docs` row. Missing keys come back with `error` set; deleted
/// documents with `value.deleted` and a null `doc`.
#[derive(Debug, Deserialize)]
struct AllDocsRow {
    key: String,
    #[serde(default)]
    value: Option<RevValue>,
    #[serde(default)]
    doc: Option<Document>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RevValue {
    rev: String,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct BulkResult {
    id: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl CouchStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        let auth = config.credentials().and_then(|(user, password)| {
            let token = STANDARD.encode(format!("{user}:{password}"));
            HeaderValue::from_str(&format!("Basic {token}")).ok()
        });
        Self {
            client,
            db_url: format!(
                "{}/{}",
                config.url.trim_end_matches('/'),
                config.database
            ),
            auth,
        }
    }

    /// Create the database if it does not exist yet.
    pub async fn ensure_database(&self) -> Result<()> {
        let (status, body) = self.send(Method::PUT, &self.db_url, None).await?;
        match status {
            StatusCode::CREATED | StatusCode::ACCEPTED => {
                tracing::info!(db = %self.db_url, "created database");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => Ok(()),
            other => Err(status_error(other, &body).into()),
        }
    }

    /// Install (or replace) one design document per design name, with a
    /// JavaScript map function per index definition.
    pub async fn install_design_docs(&self, defs: &[IndexDefinition]) -> Result<()> {
        for (id, doc) in design_documents(defs) {
            self.set(&id, doc).await?;
            tracing::debug!(design = %id, "installed design document");
        }
        Ok(())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let uri = format!("{}/{}", self.db_url, path);
        let (status, bytes) = self.send(Method::POST, &uri, Some(body)).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes).into());
        }
        Ok(serde_json::from_slice(&bytes).map_err(StoreError::from)?)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Bytes), StoreError> {
        let payload = match body {
            Some(value) => Bytes::from(serde_json::to_vec(value)?),
            None => Bytes::new(),
        };
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(auth) = &self.auth {
            builder = builder.header(AUTHORIZATION, auth.clone());
        }
        let request = builder
            .body(Full::new(payload))
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
            .to_bytes();
        Ok((status, bytes))
    }

    async fn all_docs(&self, keys: &[String], include_docs: bool) -> Result<Vec<AllDocsRow>> {
        let path = if include_docs {
            "_all_docs?include_docs=true"
        } else {
            "_all_docs"
        };
        let value = self.post(path, &json!({ "keys": keys })).await?;
        let response: RowsResponse<AllDocsRow> =
            serde_json::from_value(value).map_err(StoreError::from)?;
        Ok(response.rows)
    }

    /// Current revision of a live document, `None` if absent or deleted.
    async fn current_rev(&self, key: &str) -> Result<Option<String>> {
        let rows = self.all_docs(&[key.to_string()], false).await?;
        Ok(rows
            .into_iter()
            .find(|row| row.key == key && row.error.is_none())
            .and_then(|row| row.value)
            .filter(|value| !value.deleted)
            .map(|value| value.rev))
    }

    async fn bulk_write(&self, doc: Document) -> Result<BulkResult> {
        let value = self.post("_bulk_docs", &json!({ "docs": [doc] })).await?;
        let mut results: Vec<BulkResult> =
            serde_json::from_value(value).map_err(StoreError::from)?;
        results
            .pop()
            .ok_or_else(|| StoreError::Malformed("empty _bulk_docs response".into()).into())
    }
}

#[async_trait]
impl DocumentStore for CouchStore {
    async fn get(&self, key: &str) -> Result<Option<Document>> {
        let mut docs = self.get_multi(&[key.to_string()]).await?;
        Ok(docs.remove(key).and_then(Fetched::into_document))
    }

    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, Fetched>> {
        let mut result: HashMap<String, Fetched> = keys
            .iter()
            .map(|key| (key.clone(), Fetched::Missing))
            .collect();
        if keys.is_empty() {
            return Ok(result);
        }
        for row in self.all_docs(keys, true).await? {
            if row.error.is_some() {
                continue;
            }
            if let Some(doc) = row.doc {
                result.insert(row.key, Fetched::Found(strip_meta(doc)));
            }
        }
        Ok(result)
    }

    async fn add(&self, key: &str, mut doc: Document) -> Result<()> {
        doc.insert("_id".into(), Value::String(key.to_string()));
        let result = self.bulk_write(doc).await?;
        match result.error.as_deref() {
            None => Ok(()),
            Some("conflict") => Err(Error::KeyExists { id: result.id }),
            Some(error) => Err(bulk_error(error, result.reason).into()),
        }
    }

    async fn set(&self, key: &str, mut doc: Document) -> Result<()> {
        doc.remove("_rev");
        doc.insert("_id".into(), Value::String(key.to_string()));
        if let Some(rev) = self.current_rev(key).await? {
            doc.insert("_rev".into(), Value::String(rev));
        }
        let result = self.bulk_write(doc).await?;
        match result.error {
            None => Ok(()),
            Some(error) => Err(bulk_error(&error, result.reason).into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let Some(rev) = self.current_rev(key).await? else {
            return Ok(false);
        };
        let mut tombstone = Document::new();
        tombstone.insert("_id".into(), Value::String(key.to_string()));
        tombstone.insert("_rev".into(), Value::String(rev));
        tombstone.insert("_deleted".into(), Value::Bool(true));
        let result = self.bulk_write(tombstone).await?;
        match result.error {
            None => Ok(true),
            Some(error) => Err(bulk_error(&error, result.reason).into()),
        }
    }

    async fn query(&self, index: IndexName, bounds: &QueryBounds) -> Result<Vec<IndexRow>> {
        let path = format!("_design/{}/_view/{}", index.design, index.view);
        let value = self.post(&path, &view_request(bounds)).await?;
        let response: RowsResponse<IndexRow> =
            serde_json::from_value(value).map_err(StoreError::from)?;
        Ok(response
            .rows
            .into_iter()
            .map(|mut row| {
                row.doc = row.doc.map(strip_meta);
                row
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// JSON body for a view query.
pub fn view_request(bounds: &QueryBounds) -> Value {
    let mut body = json!({
        "limit": bounds.limit,
        "include_docs": bounds.include_docs,
    });
    match &bounds.range {
        KeyRange::All => {}
        KeyRange::Single(key) => {
            body["key"] = json!(key);
        }
        KeyRange::Range { start, end } => {
            body["startkey"] = json!(start);
            if let Some(end) = end {
                body["endkey"] = json!(end);
                body["inclusive_end"] = json!(false);
            }
        }
    }
    body
}

/// One design document per design name, keyed by `_design/{name}`.
pub fn design_documents(defs: &[IndexDefinition]) -> Vec<(String, Document)> {
    let mut designs: BTreeMap<&str, serde_json::Map<String, Value>> = BTreeMap::new();
    for def in defs {
        let map = format!(
            "function (doc) {{ if (doc.{type_field} === '{doc_type}' && typeof doc.{key} === 'string') {{ emit(doc.{key}, null); }} }}",
            type_field = nutshell_core::types::TYPE_FIELD,
            doc_type = def.doc_type,
            key = def.key_field,
        );
        designs
            .entry(def.name.design)
            .or_default()
            .insert(def.name.view.to_string(), json!({ "map": map }));
    }
    designs
        .into_iter()
        .map(|(design, views)| {
            let mut doc = Document::new();
            doc.insert("language".into(), json!("javascript"));
            doc.insert("views".into(), Value::Object(views));
            (format!("_design/{design}"), doc)
        })
        .collect()
}

fn strip_meta(mut doc: Document) -> Document {
    doc.remove("_id");
    doc.remove("_rev");
    doc
}

fn status_error(status: StatusCode, body: &[u8]) -> StoreError {
    StoreError::Status {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

fn bulk_error(error: &str, reason: Option<String>) -> StoreError {
    StoreError::Malformed(match reason {
        Some(reason) => format!("bulk write failed: {error}: {reason}"),
        None => format!("bulk write failed: {error}"),
    })
}
