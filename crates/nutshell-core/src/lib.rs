//! nutshell-core: the data-access layer behind the nutshell front-end.
//!
//! This crate holds everything between a store query and a rendered page,
//! plus the shared types used across the workspace.
//!
//! # Architecture
//!
//! ```text
//! request ──► query ──► DocumentStore ──► mapper ──► presentation
//!    │                      ▲
//!    └──► form ─────────────┘
//! ```
//!
//! Store backends live in `nutshell-store`; the HTTP surface in
//! `nutshell-web`.

pub mod config;
pub mod entity;
pub mod error;
pub mod form;
pub mod mapper;
pub mod query;
pub mod store;
pub mod types;

pub use entity::{CustomerEntity, EntityLink, LogEntity};
pub use error::{Error, Result, StoreError, ValidationError};
pub use query::{build_prefix_query, mapkey_single, KeyRange, QueryBounds};
pub use store::{DocumentStore, Fetched, SharedStore};
pub use types::{Document, EntityKind, IndexDefinition, IndexName, IndexRow};
