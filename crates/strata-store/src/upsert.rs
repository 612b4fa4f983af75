//! Temporal upsert engine (write path)
//!
//! Applies one full snapshot batch to a versioned table: scd1 attributes are
//! overwritten on the active row, scd2 changes close the active row and open
//! a successor, and entities absent from the batch are closed with no
//! successor. All transitions of one batch share a single timestamp and run
//! in one transaction.

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use strata_core::clock::BatchClock;
use strata_core::identity::{self, Fingerprints};
use strata_core::record::TemporalRecord;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{consistency_mismatch, duplicate_key, from_rusqlite, Result};
use crate::hydration::{placeholders, to_sql_value, IN_CHUNK};
use crate::snapshot::SnapshotStore;

/// Write path for one entity type at a time
///
/// Takes the connection and clock explicitly; one engine invocation is one
/// batch, one timestamp, one transaction. The engine never retries; a
/// retryable failure means the caller re-runs the whole batch.
pub struct UpsertEngine<'a> {
    conn: &'a mut Connection,
    clock: &'a dyn BatchClock,
}

#[derive(Debug)]
struct Staged<R> {
    record: R,
    prints: Fingerprints,
}

struct StoredPrints {
    attribute_hash_scd1: String,
    attribute_hash_scd2: String,
}

impl<'a> UpsertEngine<'a> {
    pub fn new(conn: &'a mut Connection, clock: &'a dyn BatchClock) -> Self {
        Self { conn, clock }
    }

    /// Apply one snapshot batch and return the reloaded current versions,
    /// keyed by key hash
    ///
    /// The batch must hold each entity at most once; a duplicate key hash is
    /// rejected before anything is written. An empty batch is a no-op.
    pub fn apply<R: TemporalRecord>(&mut self, batch: Vec<R>) -> Result<BTreeMap<String, R>> {
        if batch.is_empty() {
            return Ok(BTreeMap::new());
        }

        let staged = stage(batch)?;
        // One timestamp for every transition this batch produces
        let at_ms = self.clock.now().timestamp_millis();

        // IMMEDIATE takes the write lock up front, so an overlapping
        // invocation blocks here instead of failing mid-batch
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let active = load_active_prints::<R>(&tx)?;
        let batch_keys: BTreeSet<&str> = staged
            .iter()
            .map(|s| s.prints.key_hash.as_str())
            .collect();

        // Partition the batch: an scd2 change replaces the row outright, so
        // it must not also be scd1-updated in place
        let mut scd1_updates: Vec<&Staged<R>> = Vec::new();
        let mut inserts: Vec<&Staged<R>> = Vec::new();
        let mut closes: Vec<String> = Vec::new();
        for s in &staged {
            match active.get(&s.prints.key_hash) {
                None => inserts.push(s),
                Some(stored) if stored.attribute_hash_scd2 != s.prints.attribute_hash_scd2 => {
                    closes.push(s.prints.key_hash.clone());
                    inserts.push(s);
                }
                Some(stored) if stored.attribute_hash_scd1 != s.prints.attribute_hash_scd1 => {
                    scd1_updates.push(s);
                }
                Some(_) => {}
            }
        }
        // Entities that disappeared from the snapshot: closed, no successor
        for key_hash in active.keys() {
            if !batch_keys.contains(key_hash.as_str()) {
                closes.push(key_hash.clone());
            }
        }

        update_scd1_in_place(&tx, &scd1_updates, at_ms)?;
        close_versions::<R>(&tx, &closes, at_ms)?;
        insert_versions(&tx, &inserts, at_ms)?;
        tx.commit().map_err(from_rusqlite)?;

        debug!(
            table = R::table_name(),
            scd1_updated = scd1_updates.len(),
            closed = closes.len(),
            inserted = inserts.len(),
            "committed snapshot batch"
        );

        // Read-back: the write path and read path must agree on what is
        // current, or the batch result would be partial
        let key_hashes: Vec<String> = staged
            .iter()
            .map(|s| s.prints.key_hash.clone())
            .collect();
        let current = SnapshotStore::current_by_key_hashes::<R>(self.conn, &key_hashes)?;
        if current.len() != staged.len() {
            return Err(consistency_mismatch(
                R::table_name(),
                staged.len(),
                current.len(),
            ));
        }

        info!(
            table = R::table_name(),
            batch = staged.len(),
            "snapshot batch applied"
        );
        Ok(current)
    }
}

/// Fingerprint every entity and reject duplicate key hashes
fn stage<R: TemporalRecord>(batch: Vec<R>) -> Result<Vec<Staged<R>>> {
    let mut seen = BTreeSet::new();
    batch
        .into_iter()
        .map(|record| {
            let prints = identity::fingerprints(&record);
            if !seen.insert(prints.key_hash.clone()) {
                return Err(duplicate_key(R::table_name(), &prints.key_hash));
            }
            Ok(Staged { record, prints })
        })
        .collect()
}

/// Fingerprints of every open row, keyed by key hash
fn load_active_prints<R: TemporalRecord>(
    tx: &Transaction<'_>,
) -> Result<BTreeMap<String, StoredPrints>> {
    let sql = format!(
        "SELECT key_hash, attribute_hash_scd1, attribute_hash_scd2 FROM {} WHERE active_to IS NULL",
        R::table_name(),
    );
    let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                StoredPrints {
                    attribute_hash_scd1: row.get(1)?,
                    attribute_hash_scd2: row.get(2)?,
                },
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows.into_iter().collect())
}

/// Type-1 pass: overwrite scd1 attributes on the active row, leaving the
/// validity interval untouched
fn update_scd1_in_place<R: TemporalRecord>(
    tx: &Transaction<'_>,
    updates: &[&Staged<R>],
    at_ms: i64,
) -> Result<()> {
    let mut scd1_keys = R::scd1_attribute_keys().to_vec();
    if updates.is_empty() || scd1_keys.is_empty() {
        return Ok(());
    }
    scd1_keys.sort_unstable();

    let assignments: Vec<String> = scd1_keys.iter().map(|c| format!("{} = ?", c)).collect();
    let sql = format!(
        "UPDATE {} SET {}, attribute_hash_scd1 = ?, updated_at = ? WHERE key_hash = ? AND active_to IS NULL",
        R::table_name(),
        assignments.join(", "),
    );
    let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;

    for staged in updates {
        let mut params: Vec<Value> = scd1_keys
            .iter()
            .map(|c| to_sql_value(staged.record.value(c)))
            .collect();
        params.push(Value::Text(staged.prints.attribute_hash_scd1.clone()));
        params.push(Value::Integer(at_ms));
        params.push(Value::Text(staged.prints.key_hash.clone()));
        let changed = stmt
            .execute(params_from_iter(params))
            .map_err(from_rusqlite)?;
        if changed != 1 {
            return Err(consistency_mismatch(R::table_name(), 1, changed));
        }
    }
    Ok(())
}

/// Type-2 close pass: stamp active_to on rows superseded or deleted
fn close_versions<R: TemporalRecord>(
    tx: &Transaction<'_>,
    closes: &[String],
    at_ms: i64,
) -> Result<()> {
    let mut closed = 0usize;
    for chunk in closes.chunks(IN_CHUNK) {
        let sql = format!(
            "UPDATE {} SET active_to = ?, updated_at = ? WHERE active_to IS NULL AND key_hash IN ({})",
            R::table_name(),
            placeholders(chunk.len()),
        );
        let mut params: Vec<Value> = vec![Value::Integer(at_ms), Value::Integer(at_ms)];
        params.extend(chunk.iter().map(|k| Value::Text(k.clone())));
        closed += tx
            .execute(&sql, params_from_iter(params))
            .map_err(from_rusqlite)?;
    }
    if closed != closes.len() {
        return Err(consistency_mismatch(R::table_name(), closes.len(), closed));
    }
    Ok(())
}

/// Type-2 insert pass: open a fresh version for new and changed entities
fn insert_versions<R: TemporalRecord>(
    tx: &Transaction<'_>,
    inserts: &[&Staged<R>],
    at_ms: i64,
) -> Result<()> {
    if inserts.is_empty() {
        return Ok(());
    }

    let columns = R::columns();
    let sql = format!(
        "INSERT INTO {} (id, key_hash, attribute_hash_scd1, attribute_hash_scd2, \
         active_from, active_to, created_at, updated_at, {}) VALUES ({})",
        R::table_name(),
        columns.join(", "),
        placeholders(8 + columns.len()),
    );
    let mut stmt = tx.prepare(&sql).map_err(from_rusqlite)?;

    for staged in inserts {
        let mut params: Vec<Value> = vec![
            Value::Text(Uuid::new_v4().to_string()),
            Value::Text(staged.prints.key_hash.clone()),
            Value::Text(staged.prints.attribute_hash_scd1.clone()),
            Value::Text(staged.prints.attribute_hash_scd2.clone()),
            Value::Integer(at_ms),
            Value::Null,
            Value::Integer(at_ms),
            Value::Integer(at_ms),
        ];
        params.extend(columns.iter().map(|c| to_sql_value(staged.record.value(c))));
        stmt.execute(params_from_iter(params))
            .map_err(from_rusqlite)?;
    }
    Ok(())
}
