//! In-memory document store.
//!
//! Documents live in a `BTreeMap` keyed by id. Secondary indexes are not
//! materialised: each query walks the documents, applies the registered
//! [`IndexDefinition`], filters by key range, then sorts by `(key, id)`.
//! Good enough for development, demos and tests; not a storage engine.

use async_trait::async_trait;
use nutshell_core::error::{Error, Result, StoreError};
use nutshell_core::query::QueryBounds;
use nutshell_core::store::{DocumentStore, Fetched};
use nutshell_core::types::{Document, IndexDefinition, IndexName, IndexRow, STANDARD_INDEXES};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
    indexes: Vec<IndexDefinition>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with the four standard indexes registered.
    pub fn new() -> Self {
        Self::with_indexes(STANDARD_INDEXES.to_vec())
    }

    pub fn with_indexes(indexes: Vec<IndexDefinition>) -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            indexes,
        }
    }

    /// Store pre-populated with `docs`, replacing duplicates in order.
    pub fn from_documents<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = (String, Document)>,
    {
        let store = Self::new();
        store
            .docs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(docs);
        store
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn definition(&self, index: IndexName) -> Result<&IndexDefinition> {
        self.indexes
            .iter()
            .find(|def| def.name == index)
            .ok_or_else(|| StoreError::UnknownIndex(index.to_string()).into())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.get(key).cloned())
    }

    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, Fetched>> {
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(keys
            .iter()
            .map(|key| {
                let fetched = match docs.get(key) {
                    Some(doc) => Fetched::Found(doc.clone()),
                    None => Fetched::Missing,
                };
                (key.clone(), fetched)
            })
            .collect())
    }

    async fn add(&self, key: &str, doc: Document) -> Result<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        if docs.contains_key(key) {
            return Err(Error::KeyExists { id: key.to_string() });
        }
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn set(&self, key: &str, doc: Document) -> Result<()> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.remove(key).is_some())
    }

    async fn query(&self, index: IndexName, bounds: &QueryBounds) -> Result<Vec<IndexRow>> {
        let def = self.definition(index)?;
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);

        let mut rows: Vec<IndexRow> = docs
            .iter()
            .filter_map(|(id, doc)| {
                let key = def.emit(doc)?;
                if !bounds.range.contains(key) {
                    return None;
                }
                let row = IndexRow::new(key, id.as_str());
                Some(if bounds.include_docs {
                    row.with_doc(doc.clone())
                } else {
                    row
                })
            })
            .collect();

        // Ids are already ascending from the BTreeMap; a stable sort on the
        // key keeps them as the tie-breaker.
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows.truncate(bounds.limit);
        Ok(rows)
    }
}
