//! Scalar field values
//!
//! Records expose their fields as `FieldValue`s so identity hashing and SQL
//! binding share one total, stable representation of every column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, Result, StrataError};

/// A single column value in canonical scalar form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// Append the canonical byte encoding of this value to `buf`
    ///
    /// The encoding is a type tag followed by a length-prefixed payload.
    /// Booleans encode exactly like the integers 0/1 because SQLite stores
    /// them as integers; hydrated rows must fingerprint identically to the
    /// in-memory records they came from.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            FieldValue::Null => {
                buf.push(0x00);
                buf.extend_from_slice(&0u32.to_be_bytes());
            }
            FieldValue::Bool(b) => FieldValue::Int(i64::from(*b)).encode_into(buf),
            FieldValue::Int(i) => {
                buf.push(0x01);
                buf.extend_from_slice(&8u32.to_be_bytes());
                buf.extend_from_slice(&i.to_be_bytes());
            }
            FieldValue::Real(r) => {
                buf.push(0x02);
                buf.extend_from_slice(&8u32.to_be_bytes());
                buf.extend_from_slice(&r.to_bits().to_be_bytes());
            }
            FieldValue::Text(t) => {
                buf.push(0x03);
                buf.extend_from_slice(&(t.len() as u32).to_be_bytes());
                buf.extend_from_slice(t.as_bytes());
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => FieldValue::Null,
        }
    }
}

/// Column-name → value mapping used to hydrate records from stored rows
pub type ValueMap = BTreeMap<String, FieldValue>;

fn missing(column: &str) -> StrataError {
    StrataError::new(ErrorKind::MissingColumn)
        .with_op("hydrate")
        .with_message(format!("column '{}' absent from row", column))
}

fn mismatch(column: &str, expected: &str, got: &FieldValue) -> StrataError {
    StrataError::new(ErrorKind::Serialization)
        .with_op("hydrate")
        .with_message(format!(
            "column '{}': expected {}, got {:?}",
            column, expected, got
        ))
}

/// Required text column
pub fn text(values: &ValueMap, column: &str) -> Result<String> {
    match values.get(column) {
        Some(FieldValue::Text(t)) => Ok(t.clone()),
        Some(other) => Err(mismatch(column, "text", other)),
        None => Err(missing(column)),
    }
}

/// Optional text column
pub fn text_opt(values: &ValueMap, column: &str) -> Result<Option<String>> {
    match values.get(column) {
        Some(FieldValue::Null) | None => Ok(None),
        Some(FieldValue::Text(t)) => Ok(Some(t.clone())),
        Some(other) => Err(mismatch(column, "text", other)),
    }
}

/// Required integer column
pub fn integer(values: &ValueMap, column: &str) -> Result<i64> {
    match values.get(column) {
        Some(FieldValue::Int(i)) => Ok(*i),
        Some(other) => Err(mismatch(column, "integer", other)),
        None => Err(missing(column)),
    }
}

/// Required real column; accepts integers since SQLite may return a whole
/// REAL as an integer
pub fn real(values: &ValueMap, column: &str) -> Result<f64> {
    match values.get(column) {
        Some(FieldValue::Real(r)) => Ok(*r),
        Some(FieldValue::Int(i)) => Ok(*i as f64),
        Some(other) => Err(mismatch(column, "real", other)),
        None => Err(missing(column)),
    }
}

/// Optional real column
pub fn real_opt(values: &ValueMap, column: &str) -> Result<Option<f64>> {
    match values.get(column) {
        Some(FieldValue::Null) | None => Ok(None),
        Some(FieldValue::Real(r)) => Ok(Some(*r)),
        Some(FieldValue::Int(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(mismatch(column, "real", other)),
    }
}

/// Required boolean column; stored as integer 0/1
pub fn boolean(values: &ValueMap, column: &str) -> Result<bool> {
    match values.get(column) {
        Some(FieldValue::Bool(b)) => Ok(*b),
        Some(FieldValue::Int(0)) => Ok(false),
        Some(FieldValue::Int(1)) => Ok(true),
        Some(other) => Err(mismatch(column, "boolean", other)),
        None => Err(missing(column)),
    }
}

/// Optional boolean column; stored as integer 0/1
pub fn boolean_opt(values: &ValueMap, column: &str) -> Result<Option<bool>> {
    match values.get(column) {
        Some(FieldValue::Null) | None => Ok(None),
        Some(FieldValue::Bool(b)) => Ok(Some(*b)),
        Some(FieldValue::Int(0)) => Ok(Some(false)),
        Some(FieldValue::Int(1)) => Ok(Some(true)),
        Some(other) => Err(mismatch(column, "boolean", other)),
    }
}
