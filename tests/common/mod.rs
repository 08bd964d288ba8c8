//! Shared test utilities for nutshell integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Stores built here are in-memory unless a harness starts
//! a [`fake_couch::FakeCouch`].

pub mod builders;
pub mod fake_couch;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
