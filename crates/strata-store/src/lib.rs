//! SQLite persistence for versioned fleet snapshots
//!
//! The store owns the schema, the temporal upsert write path, and the
//! snapshot read path. Entity types and fingerprints live in strata-core;
//! nothing outside this crate touches SQL.

#![allow(clippy::result_large_err)]

pub mod db;
pub mod errors;
mod hydration;
pub mod migrations;
pub mod snapshot;
pub mod upsert;

pub use db::{configure, open, open_in_memory};
pub use errors::Result;
pub use migrations::apply_migrations;
pub use snapshot::SnapshotStore;
pub use upsert::UpsertEngine;
