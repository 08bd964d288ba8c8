//! Store: the document database contract the front-end is written against.
//!
//! Backends live in `nutshell-store`. Handlers only ever see an
//! `Arc<dyn DocumentStore>` created by the process entry point.

use crate::error::Result;
use crate::query::QueryBounds;
use crate::types::{Document, IndexName, IndexRow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-key outcome of a batch fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Found(Document),
    Missing,
}

impl Fetched {
    pub fn is_found(&self) -> bool {
        matches!(self, Fetched::Found(_))
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Fetched::Found(doc) => Some(doc),
            Fetched::Missing => None,
        }
    }
}

/// Shared handle to a store backend.
pub type SharedStore = Arc<dyn DocumentStore>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Document>>;

    /// Fetch many documents in one round trip. Every requested key appears in
    /// the result; absent keys map to [`Fetched::Missing`].
    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, Fetched>>;

    /// Create a document. Fails with `Error::KeyExists` if `key` is taken.
    async fn add(&self, key: &str, doc: Document) -> Result<()>;

    /// Create or replace a document.
    async fn set(&self, key: &str, doc: Document) -> Result<()>;

    /// Remove a document. Returns `false` if `key` was absent.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Scan a secondary index. Rows come back ordered by key, then id, and
    /// are cut off at `bounds.limit`.
    async fn query(&self, index: IndexName, bounds: &QueryBounds) -> Result<Vec<IndexRow>>;
}
