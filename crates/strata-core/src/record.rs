//! Temporal record capability trait
//!
//! Each entity type declares its business keys, scd1 attribute keys, and
//! column set statically; the upsert engine and snapshot store resolve
//! everything through this trait, never through runtime introspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::value::{FieldValue, ValueMap};

/// Versioning metadata carried by every stored row
///
/// All fields are `None` on a record that has not been through the upsert
/// engine yet; the engine computes hashes and validity bounds when it writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineage {
    /// Technical row id, fresh per version
    pub id: Option<String>,
    pub key_hash: Option<String>,
    pub attribute_hash_scd1: Option<String>,
    pub attribute_hash_scd2: Option<String>,
    pub active_from: Option<DateTime<Utc>>,
    /// `None` means this row is the current version
    pub active_to: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lineage {
    /// Whether this row is a stored current version
    pub fn is_active(&self) -> bool {
        self.active_from.is_some() && self.active_to.is_none()
    }
}

/// Static capability interface for entities persisted with history
pub trait TemporalRecord: Clone + Sized {
    /// Table this record set persists to
    fn table_name() -> &'static str;

    /// Fields that jointly identify the real-world entity across its lifetime
    fn business_keys() -> &'static [&'static str];

    /// Attributes overwritten in place; changes never open a new version
    ///
    /// Defaults to empty: every non-business attribute tracks history unless
    /// the type opts it out here. Foreign keys to other versioned tables
    /// belong in this list, since they point at the parent's current row.
    fn scd1_attribute_keys() -> &'static [&'static str] {
        &[]
    }

    /// Every domain column, in schema order
    fn columns() -> &'static [&'static str];

    /// Value of a single domain column
    ///
    /// Must be total over `columns()`; the conversion has to keep
    /// distinguishable values distinguishable, since fingerprints are
    /// computed from it.
    fn value(&self, column: &str) -> FieldValue;

    /// Rebuild a record from a stored row's column values
    fn from_values(values: &ValueMap) -> Result<Self>;

    fn lineage(&self) -> &Lineage;

    fn lineage_mut(&mut self) -> &mut Lineage;

    /// Non-business attributes, sorted by name
    fn attribute_keys() -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Self::columns()
            .iter()
            .copied()
            .filter(|c| !Self::business_keys().contains(c))
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Attributes whose changes open a new version, sorted by name
    fn scd2_attribute_keys() -> Vec<&'static str> {
        Self::attribute_keys()
            .into_iter()
            .filter(|c| !Self::scd1_attribute_keys().contains(c))
            .collect()
    }
}
