//! Form normalizer: flat, prefix-tagged form fields into a document body.
//!
//! Edit forms name their inputs `<entity>_<field>` (`log_name`,
//! `log_customer_id`) so one page can carry fields for several entity types.
//! [`normalize`] keeps the fields for one prefix, strips the prefix and
//! validates the result. This is the only place the naming convention exists;
//! handlers work with the returned [`Document`].

use crate::error::{Result, ValidationError};
use crate::store::DocumentStore;
use crate::types::Document;
use serde_json::Value;

/// Split `log_customer_id` into `("log", "customer_id")`. Keys without an
/// underscore have no prefix and yield `None`.
pub fn split_field(key: &str) -> Option<(&str, &str)> {
    key.split_once('_')
}

/// Keep the fields tagged with `expected_prefix`, keyed by their bare name.
/// A repeated field keeps its last value.
pub fn collect_fields<'a, I>(fields: I, expected_prefix: &str) -> Document
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut doc = Document::new();
    for (key, value) in fields {
        match split_field(key) {
            Some((prefix, name)) if prefix == expected_prefix => {
                doc.insert(name.to_string(), Value::String(value.to_string()));
            }
            _ => continue,
        }
    }
    doc
}

/// Build and validate a document from submitted form fields.
///
/// Checks run in order and stop at the first failure:
/// a non-empty `name`, a non-empty `customer_id`, and a `customer_id` that
/// names an existing document.
pub async fn normalize<'a, I>(
    fields: I,
    expected_prefix: &str,
    store: &dyn DocumentStore,
) -> Result<Document>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let doc = collect_fields(fields, expected_prefix);

    if non_empty(&doc, "name").is_none() {
        return Err(ValidationError::bad_request("Must have name").into());
    }

    let customer_id = match non_empty(&doc, "customer_id") {
        Some(id) => id.to_string(),
        None => return Err(ValidationError::bad_request("Must have customer ID").into()),
    };

    if store.get(&customer_id).await?.is_none() {
        return Err(
            ValidationError::bad_request(format!("Customer ID {customer_id} not found")).into(),
        );
    }

    Ok(doc)
}

/// Document id for a new log: `{customer_id}-{name}`, with the name
/// lowercased and spaces replaced by underscores.
pub fn log_id(doc: &Document) -> String {
    let customer_id = non_empty(doc, "customer_id").unwrap_or_default();
    let name = non_empty(doc, "name").unwrap_or_default();
    format!("{}-{}", customer_id, name.replace(' ', "_").to_lowercase())
}

fn non_empty<'d>(doc: &'d Document, field: &str) -> Option<&'d str> {
    doc.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
