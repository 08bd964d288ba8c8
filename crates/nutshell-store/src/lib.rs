//! nutshell-store: document store backends for nutshell.
//!
//! Each backend implements [`nutshell_core::DocumentStore`]. The process
//! entry point calls [`open`] once and hands the resulting
//! [`SharedStore`](nutshell_core::SharedStore) to the HTTP layer.

pub mod couch;
pub mod memory;
pub mod seed;

pub use couch::CouchStore;
pub use memory::MemoryStore;

use nutshell_core::config::{Backend, StoreConfig};
use nutshell_core::types::STANDARD_INDEXES;
use nutshell_core::{Result, SharedStore};
use std::sync::Arc;

/// Build the configured backend. For CouchDB this also creates the database
/// and installs the design documents for the standard indexes.
pub async fn open(config: &StoreConfig) -> Result<SharedStore> {
    match config.backend {
        Backend::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::CouchDb => {
            tracing::info!(url = %config.url, database = %config.database, "using CouchDB document store");
            let store = CouchStore::new(config);
            store.ensure_database().await?;
            store.install_design_docs(STANDARD_INDEXES).await?;
            Ok(Arc::new(store))
        }
    }
}
