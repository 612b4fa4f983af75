//! Row hydration
//!
//! Shared by the snapshot read path and the engine's read-back: converts a
//! selected row back into a typed record plus its lineage metadata.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use rusqlite::types::{Value, ValueRef};
use rusqlite::Row;
use strata_core::errors::{ErrorKind, StrataError};
use strata_core::record::{Lineage, TemporalRecord};
use strata_core::value::{FieldValue, ValueMap};

use crate::errors::{from_rusqlite, Result};

/// Lineage columns appended to every select, in this order
pub(crate) const LINEAGE_COLUMNS: [&str; 8] = [
    "id",
    "key_hash",
    "attribute_hash_scd1",
    "attribute_hash_scd2",
    "active_from",
    "active_to",
    "created_at",
    "updated_at",
];

/// Keys per `IN (...)` list, well under SQLite's parameter limit
pub(crate) const IN_CHUNK: usize = 500;

/// Domain columns followed by lineage columns, comma-separated
pub(crate) fn select_list<R: TemporalRecord>() -> String {
    let mut columns: Vec<&str> = R::columns().to_vec();
    columns.extend(LINEAGE_COLUMNS);
    columns.join(", ")
}

/// `?, ?, ...` with `n` placeholders
pub(crate) fn placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n * 3);
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out
}

/// Convert a field value into an owned SQL value; booleans persist as 0/1
pub(crate) fn to_sql_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Integer(i64::from(b)),
        FieldValue::Int(i) => Value::Integer(i),
        FieldValue::Real(r) => Value::Real(r),
        FieldValue::Text(t) => Value::Text(t),
    }
}

fn column_value(row: &Row<'_>, idx: usize) -> Result<FieldValue> {
    Ok(match row.get_ref(idx).map_err(from_rusqlite)? {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Int(i),
        ValueRef::Real(r) => FieldValue::Real(r),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(s) => FieldValue::Text(s.to_string()),
            Err(err) => {
                return Err(StrataError::new(ErrorKind::Serialization)
                    .with_op("hydrate")
                    .with_message(format!("text column is not valid UTF-8: {}", err)))
            }
        },
        // no blob columns in this schema
        ValueRef::Blob(_) => FieldValue::Null,
    })
}

/// Build a record and its lineage from one selected row
///
/// Expects the select list produced by [`select_list`]: domain columns in
/// schema order, then the lineage columns.
pub(crate) fn hydrate_row<R: TemporalRecord>(row: &Row<'_>) -> Result<R> {
    let mut values = ValueMap::new();
    for (idx, column) in R::columns().iter().enumerate() {
        values.insert((*column).to_string(), column_value(row, idx)?);
    }
    let mut record = R::from_values(&values)?;

    let base = R::columns().len();
    let id: String = row.get(base).map_err(from_rusqlite)?;
    let key_hash: String = row.get(base + 1).map_err(from_rusqlite)?;
    let attribute_hash_scd1: String = row.get(base + 2).map_err(from_rusqlite)?;
    let attribute_hash_scd2: String = row.get(base + 3).map_err(from_rusqlite)?;
    let active_from_ms: i64 = row.get(base + 4).map_err(from_rusqlite)?;
    let active_to_ms: Option<i64> = row.get(base + 5).map_err(from_rusqlite)?;
    let created_at_ms: i64 = row.get(base + 6).map_err(from_rusqlite)?;
    let updated_at_ms: i64 = row.get(base + 7).map_err(from_rusqlite)?;

    *record.lineage_mut() = Lineage {
        id: Some(id),
        key_hash: Some(key_hash),
        attribute_hash_scd1: Some(attribute_hash_scd1),
        attribute_hash_scd2: Some(attribute_hash_scd2),
        active_from: timestamp(active_from_ms),
        active_to: active_to_ms.and_then(timestamp),
        created_at: timestamp(created_at_ms),
        updated_at: timestamp(updated_at_ms),
    };

    Ok(record)
}

fn timestamp(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
