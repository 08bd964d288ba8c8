//! Core types for nutshell-core.
//!
//! This module defines the data shapes shared by every layer: the raw
//! [`Document`] body, the [`IndexRow`] produced by a secondary-index query,
//! the [`IndexName`] / [`IndexDefinition`] pair that names and describes an
//! index, and the [`EntityKind`] discriminant.

use serde::{Deserialize, Serialize};

/// A stored document body. Keys are field names; values are arbitrary JSON.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Document field holding the record type (`node_snapshot`, `customer`, …).
pub const TYPE_FIELD: &str = "type";

/// One entry from a secondary-index query.
///
/// Rows are ordered by `key` (lexicographic), ties broken by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    /// Sort key emitted by the index.
    pub key: String,
    /// Emitted value. Usually `null`.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Identifier of the document that emitted this row.
    pub id: String,
    /// Full document, present only when the query asked for `include_docs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,
}

impl IndexRow {
    pub fn new(key: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: serde_json::Value::Null,
            id: id.into(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: Document) -> Self {
        self.doc = Some(doc);
        self
    }
}

/// Name of a secondary index: the design document and the view inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexName {
    pub design: &'static str,
    pub view: &'static str,
}

impl IndexName {
    pub const fn new(design: &'static str, view: &'static str) -> Self {
        Self { design, view }
    }
}

impl std::fmt::Display for IndexName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.design, self.view)
    }
}

/// Logs, sorted by display name.
pub const LOGS_BY_NAME: IndexName = IndexName::new("node_snapshot", "by_name");
/// Logs, sorted by owning customer id.
pub const LOGS_BY_CUSTOMER: IndexName = IndexName::new("node_snapshot", "by_customer");
/// Customers, sorted by display name.
pub const CUSTOMERS_BY_NAME: IndexName = IndexName::new("customer", "by_name");
/// Clusters, sorted by owning customer id.
pub const CLUSTERS_BY_CUSTOMER: IndexName = IndexName::new("cluster", "by_customer");

/// How an index is built: every document whose `type` equals `doc_type` and
/// which carries a string `key_field` emits one row keyed by that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: IndexName,
    pub doc_type: &'static str,
    pub key_field: &'static str,
}

impl IndexDefinition {
    /// The sort key this definition emits for `doc`, if any.
    pub fn emit<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        let doc_type = doc.get(TYPE_FIELD).and_then(|v| v.as_str())?;
        if doc_type != self.doc_type {
            return None;
        }
        doc.get(self.key_field).and_then(|v| v.as_str())
    }
}

/// The four indexes the front-end queries.
pub const STANDARD_INDEXES: &[IndexDefinition] = &[
    IndexDefinition {
        name: LOGS_BY_NAME,
        doc_type: "node_snapshot",
        key_field: "name",
    },
    IndexDefinition {
        name: LOGS_BY_CUSTOMER,
        doc_type: "node_snapshot",
        key_field: "customer_id",
    },
    IndexDefinition {
        name: CUSTOMERS_BY_NAME,
        doc_type: "customer",
        key_field: "name",
    },
    IndexDefinition {
        name: CLUSTERS_BY_CUSTOMER,
        doc_type: "cluster",
        key_field: "customer_id",
    },
];

/// Which kind of record an entity or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Log,
    Customer,
    Cluster,
}

impl EntityKind {
    /// Value of the document `type` field for this kind.
    pub fn doc_type(self) -> &'static str {
        match self {
            EntityKind::Log => "node_snapshot",
            EntityKind::Customer => "customer",
            EntityKind::Cluster => "cluster",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Log => write!(f, "log"),
            EntityKind::Customer => write!(f, "customer"),
            EntityKind::Cluster => write!(f, "cluster"),
        }
    }
}
