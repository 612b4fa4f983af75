//! Error handling for strata-store
//!
//! Wraps the strata-core error facility with store-specific constructors

use strata_core::errors::{ErrorKind, StrataError};

/// Result type alias using StrataError
pub type Result<T> = strata_core::errors::Result<T>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> StrataError {
    StrataError::new(ErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> StrataError {
    StrataError::new(ErrorKind::Consistency)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a duplicate-key-hash batch rejection
pub fn duplicate_key(table: &str, key_hash: &str) -> StrataError {
    StrataError::new(ErrorKind::DuplicateKey)
        .with_op("upsert")
        .with_table(table)
        .with_message(format!("batch contains key hash {} twice", key_hash))
}

/// Create an error for a hydrated row without a key hash
///
/// Hydration always fills lineage from the selected columns, so hitting this
/// means the select list and the lineage mapping have diverged.
pub fn missing_key_hash(table: &str) -> StrataError {
    StrataError::new(ErrorKind::Internal)
        .with_op("hydrate")
        .with_table(table)
        .with_message("hydrated row carries no key hash")
}

/// Create a fatal read-back mismatch error
pub fn consistency_mismatch(table: &str, expected: usize, actual: usize) -> StrataError {
    StrataError::new(ErrorKind::Consistency)
        .with_op("upsert_readback")
        .with_table(table)
        .with_message(format!(
            "reloaded {} current rows, expected {}",
            actual, expected
        ))
}

/// Create a database error from rusqlite::Error
///
/// Busy/locked failures are classified retryable; the batch transaction left
/// no partial state behind.
pub fn from_rusqlite(err: rusqlite::Error) -> StrataError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                ErrorKind::Busy
            }
            _ => ErrorKind::Persistence,
        },
        _ => ErrorKind::Persistence,
    };
    StrataError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}
