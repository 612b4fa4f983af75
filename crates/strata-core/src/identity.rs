//! Entity identity and change-detection fingerprints
//!
//! Three independent SHA-256 hashes per record: `key_hash` identifies the
//! entity across its whole lifetime, the two attribute hashes detect scd1 and
//! scd2 changes. All three are pure functions of field values.

use sha2::{Digest, Sha256};

use crate::record::TemporalRecord;

/// The three fingerprints of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprints {
    pub key_hash: String,
    pub attribute_hash_scd1: String,
    pub attribute_hash_scd2: String,
}

/// Compute all three fingerprints for a record
pub fn fingerprints<R: TemporalRecord>(record: &R) -> Fingerprints {
    Fingerprints {
        key_hash: key_hash(record),
        attribute_hash_scd1: attribute_hash_scd1(record),
        attribute_hash_scd2: attribute_hash_scd2(record),
    }
}

/// Hash of the business key values; stable across all versions of an entity
pub fn key_hash<R: TemporalRecord>(record: &R) -> String {
    let mut keys = R::business_keys().to_vec();
    keys.sort_unstable();
    fingerprint(record, &keys)
}

/// Hash of the scd1 attribute values
pub fn attribute_hash_scd1<R: TemporalRecord>(record: &R) -> String {
    let mut keys = R::scd1_attribute_keys().to_vec();
    keys.sort_unstable();
    fingerprint(record, &keys)
}

/// Hash of the scd2 attribute values
pub fn attribute_hash_scd2<R: TemporalRecord>(record: &R) -> String {
    // already sorted by the trait's derivation
    fingerprint(record, &R::scd2_attribute_keys())
}

/// Field names and values are length-prefixed before hashing, so adjacent
/// fields cannot collide after concatenation: ("a-b", "c") and ("a", "b-c")
/// produce different digests no matter what the values contain.
fn fingerprint<R: TemporalRecord>(record: &R, keys: &[&str]) -> String {
    let mut hasher = Sha256::new();
    let mut buf = Vec::new();
    for key in keys {
        hasher.update((key.len() as u32).to_be_bytes());
        hasher.update(key.as_bytes());
        buf.clear();
        record.value(key).encode_into(&mut buf);
        hasher.update(&buf);
    }
    hex::encode(hasher.finalize())
}
