//! Snapshot store read path
//!
//! Read-only access to stored entities: current versions by key hash, all
//! current versions of a table, and the full version history. Callers outside
//! the engine default to current rows; history is an explicit request.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;

use rusqlite::{params_from_iter, Connection};
use strata_core::record::TemporalRecord;

use crate::errors::{from_rusqlite, missing_key_hash, Result};
use crate::hydration::{hydrate_row, placeholders, select_list, IN_CHUNK};

/// Read-side queries over versioned tables
pub struct SnapshotStore;

impl SnapshotStore {
    /// Current versions for the given key hashes, keyed by key hash
    ///
    /// Missing hashes are simply absent from the result; the engine turns
    /// that into a count-mismatch error, never a per-row failure.
    pub fn current_by_key_hashes<R: TemporalRecord>(
        conn: &Connection,
        key_hashes: &[String],
    ) -> Result<BTreeMap<String, R>> {
        let mut out = BTreeMap::new();
        for chunk in key_hashes.chunks(IN_CHUNK) {
            let sql = format!(
                "SELECT {} FROM {} WHERE active_to IS NULL AND key_hash IN ({})",
                select_list::<R>(),
                R::table_name(),
                placeholders(chunk.len()),
            );
            let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
            let mut rows = stmt
                .query(params_from_iter(chunk.iter()))
                .map_err(from_rusqlite)?;
            while let Some(row) = rows.next().map_err(from_rusqlite)? {
                let record: R = hydrate_row(row)?;
                let key_hash = record
                    .lineage()
                    .key_hash
                    .clone()
                    .ok_or_else(|| missing_key_hash(R::table_name()))?;
                out.insert(key_hash, record);
            }
        }
        Ok(out)
    }

    /// All current versions of a table, keyed by key hash
    pub fn current<R: TemporalRecord>(conn: &Connection) -> Result<BTreeMap<String, R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE active_to IS NULL",
            select_list::<R>(),
            R::table_name(),
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let mut rows = stmt.query([]).map_err(from_rusqlite)?;
        let mut out = BTreeMap::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            let record: R = hydrate_row(row)?;
            let key_hash = record
                .lineage()
                .key_hash
                .clone()
                .ok_or_else(|| missing_key_hash(R::table_name()))?;
            out.insert(key_hash, record);
        }
        Ok(out)
    }

    /// Every stored version, ordered by key hash then validity start
    pub fn all_versions<R: TemporalRecord>(conn: &Connection) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY key_hash, active_from",
            select_list::<R>(),
            R::table_name(),
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let mut rows = stmt.query([]).map_err(from_rusqlite)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            out.push(hydrate_row(row)?);
        }
        Ok(out)
    }
}
