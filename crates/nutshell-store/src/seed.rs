//! Fixture loading: fill a store from a JSON file.
//!
//! Two shapes are accepted:
//!
//! ```json
//! [ {"_id": "c1", "type": "customer", "name": "Acme"} ]
//! ```
//!
//! ```json
//! { "c1": {"type": "customer", "name": "Acme"} }
//! ```
//!
//! In the array form every document must carry a string `_id`, which is
//! removed from the stored body.

use nutshell_core::error::{Result, StoreError};
use nutshell_core::store::DocumentStore;
use nutshell_core::types::Document;
use serde_json::Value;
use std::path::Path;

/// Parse fixture JSON into `(id, document)` pairs, in file order.
pub fn parse_fixture(json: &str) -> Result<Vec<(String, Document)>> {
    let value: Value = serde_json::from_str(json).map_err(StoreError::from)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let Value::Object(mut doc) = item else {
                    return Err(malformed(format!("entry {i} is not an object")));
                };
                match doc.remove("_id") {
                    Some(Value::String(id)) => Ok((id, doc)),
                    _ => Err(malformed(format!("entry {i} has no string _id"))),
                }
            })
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(id, item)| match item {
                Value::Object(doc) => Ok((id, doc)),
                _ => Err(malformed(format!("document {id} is not an object"))),
            })
            .collect(),
        _ => Err(malformed("fixture must be an array or an object".into())),
    }
}

/// Read and parse a fixture file.
pub fn load_fixture(path: &Path) -> Result<Vec<(String, Document)>> {
    let json = std::fs::read_to_string(path).map_err(StoreError::from)?;
    parse_fixture(&json)
}

/// Write every fixture document with `set`. Returns how many were written.
pub async fn seed(store: &dyn DocumentStore, docs: Vec<(String, Document)>) -> Result<usize> {
    let count = docs.len();
    for (id, doc) in docs {
        store.set(&id, doc).await?;
    }
    tracing::info!(count, "seeded documents");
    Ok(count)
}

/// Load `path` and seed `store` with it.
pub async fn seed_from_file(store: &dyn DocumentStore, path: &Path) -> Result<usize> {
    let docs = load_fixture(path)?;
    seed(store, docs).await
}

fn malformed(message: String) -> nutshell_core::Error {
    StoreError::Malformed(format!("fixture: {message}")).into()
}
