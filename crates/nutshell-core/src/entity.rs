//! Display entities built fresh for each request.
//!
//! Entities never go back to the store. A [`LogEntity`] built from an index
//! row alone has no raw document; [`LogEntity::field`] then answers `""` for
//! anything other than the id and name.

use crate::types::Document;
use serde::Serialize;

/// A log (node snapshot) as shown on list, search and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntity {
    pub id: String,
    pub name: String,
    /// Owning customer, set once the log's document has been read.
    pub customer_id: Option<String>,
    #[serde(skip)]
    doc: Option<Document>,
}

impl LogEntity {
    /// Entity from an index row: the sort key becomes the name.
    pub fn from_row(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            customer_id: None,
            doc: None,
        }
    }

    /// Entity from a fetched document; name and customer come from the body.
    pub fn from_document(id: impl Into<String>, doc: Document) -> Self {
        Self {
            id: id.into(),
            name: display_value(doc.get("name")),
            customer_id: doc
                .get("customer_id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            doc: Some(doc),
        }
    }

    pub fn doc(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    /// Display value of a document field, `""` if unknown.
    pub fn field(&self, name: &str) -> String {
        field_of(self.doc.as_ref(), name)
    }

    /// Every document field as display text, sorted by field name.
    pub fn fields(&self) -> Vec<(String, String)> {
        fields_of(self.doc.as_ref())
    }
}

/// A customer as shown on list, search and detail pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerEntity {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    doc: Option<Document>,
}

impl CustomerEntity {
    pub fn from_row(id: impl Into<String>, name: impl Into<String>, doc: Option<Document>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            doc,
        }
    }

    pub fn from_document(id: impl Into<String>, doc: Document) -> Self {
        Self {
            id: id.into(),
            name: display_value(doc.get("name")),
            doc: Some(doc),
        }
    }

    pub fn doc(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    pub fn field(&self, name: &str) -> String {
        field_of(self.doc.as_ref(), name)
    }

    pub fn fields(&self) -> Vec<(String, String)> {
        fields_of(self.doc.as_ref())
    }
}

/// `{id, name}` pair linking to another record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLink {
    pub id: String,
    pub name: String,
}

fn field_of(doc: Option<&Document>, name: &str) -> String {
    display_value(doc.and_then(|d| d.get(name)))
}

fn fields_of(doc: Option<&Document>) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = doc
        .map(|d| {
            d.iter()
                .filter(|(k, _)| !k.starts_with('_'))
                .map(|(k, v)| (k.clone(), display_value(Some(v))))
                .collect()
        })
        .unwrap_or_default();
    fields.sort();
    fields
}

/// Strings as-is, `null`/absent as `""`, anything else as its JSON text.
pub fn display_value(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
