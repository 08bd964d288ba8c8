//! Canned data sets shared across harnesses.
//!
//! The standard data set has two customers, three logs whose names share
//! prefixes (`album`, `alice`, `bob`) and one cluster:
//!
//! | id        | type          | name            | customer_id |
//! |-----------|---------------|-----------------|-------------|
//! | `c1`      | customer      | Acme Corp       |             |
//! | `c2`      | customer      | Bolt Industries |             |
//! | `l-album` | node_snapshot | album           | `c1`        |
//! | `l-alice` | node_snapshot | alice           | `c1`        |
//! | `l-bob`   | node_snapshot | bob             | `c2`        |
//! | `k1`      | cluster       | acme-prod       | `c1`        |

use super::builders::StoreBuilder;
use nutshell_core::SharedStore;
use nutshell_store::MemoryStore;

/// The standard data set as a seed fixture file (array form).
pub const STANDARD_FIXTURE: &str = r#"[
  {"_id": "c1", "type": "customer", "name": "Acme Corp", "region": "eu-west"},
  {"_id": "c2", "type": "customer", "name": "Bolt Industries"},
  {"_id": "l-album", "type": "node_snapshot", "name": "album", "customer_id": "c1"},
  {"_id": "l-alice", "type": "node_snapshot", "name": "alice", "customer_id": "c1", "description": "nightly snapshot"},
  {"_id": "l-bob", "type": "node_snapshot", "name": "bob", "customer_id": "c2"},
  {"_id": "k1", "type": "cluster", "name": "acme-prod", "customer_id": "c1"}
]"#;

pub fn standard_builder() -> StoreBuilder {
    StoreBuilder::new()
        .customer("c1", "Acme Corp")
        .customer("c2", "Bolt Industries")
        .log("l-album", "album", "c1")
        .log("l-alice", "alice", "c1")
        .log("l-bob", "bob", "c2")
        .cluster("k1", "acme-prod", "c1")
}

pub fn standard_store() -> MemoryStore {
    standard_builder().build()
}

pub fn standard_shared() -> SharedStore {
    standard_builder().shared()
}
