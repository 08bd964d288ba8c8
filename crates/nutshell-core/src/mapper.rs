//! Entity mapper: turns index rows into display entities.
//!
//! Log rows are enriched with their owning customer, which lives only in the
//! log document. All documents for a page are read with a single
//! [`DocumentStore::get_multi`] call. A row whose document is gone (deleted
//! while the index still lists it) is dropped from the page, never reported
//! as an error.

use crate::entity::{CustomerEntity, EntityLink, LogEntity};
use crate::error::{Error, Result};
use crate::store::{DocumentStore, Fetched};
use crate::types::{EntityKind, IndexRow};
use std::collections::HashSet;

/// Map log index rows to entities, one batch fetch for the whole page.
///
/// Output keeps the row order, minus rows whose document is missing.
pub async fn map_log_rows(rows: Vec<IndexRow>, store: &dyn DocumentStore) -> Result<Vec<LogEntity>> {
    let mut logs: Vec<LogEntity> = rows
        .into_iter()
        .map(|row| LogEntity::from_row(row.id, row.key))
        .collect();
    if logs.is_empty() {
        return Ok(logs);
    }

    let keys: Vec<String> = {
        let mut seen = HashSet::new();
        logs.iter()
            .filter(|log| seen.insert(log.id.as_str()))
            .map(|log| log.id.clone())
            .collect()
    };
    let docs = store.get_multi(&keys).await?;

    let before = logs.len();
    logs.retain_mut(|log| match docs.get(&log.id) {
        Some(Fetched::Found(doc)) => {
            log.customer_id = doc
                .get("customer_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            true
        }
        Some(Fetched::Missing) | None => false,
    });

    if logs.len() != before {
        tracing::debug!(
            dropped = before - logs.len(),
            "skipped index rows with missing documents"
        );
    }
    Ok(logs)
}

/// Map customer index rows to entities. Rows carry the document when the
/// query asked for it.
pub fn map_customer_rows(rows: Vec<IndexRow>) -> Vec<CustomerEntity> {
    rows.into_iter()
        .map(|row| CustomerEntity::from_row(row.id, row.key, row.doc))
        .collect()
}

/// Map rows to bare `{id, name}` links.
///
/// Link rows come from by-customer indexes whose sort key is the customer id,
/// so the name is read from the attached document when there is one.
pub fn map_link_rows(rows: Vec<IndexRow>) -> Vec<EntityLink> {
    rows.into_iter()
        .map(|row| {
            let name = row
                .doc
                .as_ref()
                .and_then(|doc| doc.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or(row.key);
            EntityLink { id: row.id, name }
        })
        .collect()
}

/// Fetch one log by id for the detail view.
pub async fn fetch_log(id: &str, store: &dyn DocumentStore) -> Result<LogEntity> {
    match store.get(id).await? {
        Some(doc) => Ok(LogEntity::from_document(id, doc)),
        None => Err(Error::not_found(EntityKind::Log, id)),
    }
}

/// Fetch one customer by id for the detail view.
pub async fn fetch_customer(id: &str, store: &dyn DocumentStore) -> Result<CustomerEntity> {
    match store.get(id).await? {
        Some(doc) => Ok(CustomerEntity::from_document(id, doc)),
        None => Err(Error::not_found(EntityKind::Customer, id)),
    }
}
