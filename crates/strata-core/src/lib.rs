//! Strata Core - Temporal entity model and identity fingerprints
//!
//! This crate provides the domain layer for Strata's temporal upsert engine,
//! including:
//! - `TemporalRecord` capability trait with per-type business and scd1 keys
//! - Entity identity model: key hash plus scd1/scd2 change fingerprints
//! - Canonical scalar `FieldValue` representation shared by hashing and storage
//! - Batch clock supplying one timestamp per engine invocation
//! - Structured error facility with stable codes and retryability
//! - Concrete fleet entities (vehicle clusters and vehicles)
//!
//! The persistence layer lives in `strata-store`; nothing here touches SQL.

pub mod clock;
pub mod errors;
pub mod identity;
pub mod model;
pub mod record;
pub mod value;

// Re-export commonly used types
pub use clock::{BatchClock, FixedClock, SystemClock};
pub use errors::{ErrorKind, Result, StrataError};
pub use identity::{fingerprints, Fingerprints};
pub use model::{Vehicle, VehicleCluster, VehicleOption};
pub use record::{Lineage, TemporalRecord};
pub use value::{FieldValue, ValueMap};
