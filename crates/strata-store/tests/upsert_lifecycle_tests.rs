// Lifecycle tests for the temporal upsert engine: first load, idempotent
// re-apply, scd1 overwrite, scd2 versioning, deletion, and batch rejection.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use strata_core::clock::FixedClock;
use strata_core::identity;
use strata_core::model::VehicleCluster;
use strata_core::{ErrorKind, TemporalRecord};
use strata_store::{SnapshotStore, UpsertEngine};

fn setup() -> Connection {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut conn = strata_store::open_in_memory().unwrap();
    strata_store::configure(&conn).unwrap();
    strata_store::apply_migrations(&mut conn).unwrap();
    conn
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
}

fn apply_at<R: TemporalRecord>(
    conn: &mut Connection,
    at: DateTime<Utc>,
    batch: Vec<R>,
) -> strata_store::Result<BTreeMap<String, R>> {
    let clock = FixedClock::at(at);
    let mut engine = UpsertEngine::new(conn, &clock);
    engine.apply(batch)
}

fn cluster(make: &str, model: &str) -> VehicleCluster {
    VehicleCluster {
        first_vehicle_id: "v-1".to_string(),
        external_type_id: "T1".to_string(),
        make: make.to_string(),
        model: model.to_string(),
        latest_model_year: 2024,
        vehicle_count: 3,
        min_price_in_euro_per_month: 389.0,
        fiscal_value_in_euro: 27500.0,
        addition_percentage: 22.0,
        external_fuel_type_id: 1,
        max_co2_emission: 120,
        image_uri: "https://img.example/corsa.webp".to_string(),
        lineage: Default::default(),
    }
}

#[test]
fn first_batch_opens_current_versions() {
    let mut conn = setup();
    let t0 = at(0);

    let current = apply_at(&mut conn, t0, vec![cluster("Opel", "Corsa"), cluster("Opel", "Astra")])
        .unwrap();
    assert_eq!(current.len(), 2);
    for record in current.values() {
        assert!(record.lineage.is_active());
        assert_eq!(record.lineage.active_from, Some(t0));
        assert_eq!(record.lineage.active_to, None);
        assert!(record.lineage.id.is_some());
    }

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 2);
}

#[test]
fn identical_batch_is_idempotent() {
    let mut conn = setup();

    let first = apply_at(&mut conn, at(0), vec![cluster("Opel", "Corsa")]).unwrap();
    let second = apply_at(&mut conn, at(1), vec![cluster("Opel", "Corsa")]).unwrap();

    let before = first.values().next().unwrap();
    let after = second.values().next().unwrap();
    assert_eq!(after.lineage.id, before.lineage.id);
    assert_eq!(after.lineage.active_from, before.lineage.active_from);
    assert_eq!(after.lineage.updated_at, before.lineage.updated_at);

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 1);
}

#[test]
fn scd1_change_overwrites_in_place() {
    let mut conn = setup();
    let t0 = at(0);
    let t1 = at(1);

    let first = apply_at(&mut conn, t0, vec![cluster("Opel", "Corsa")]).unwrap();
    let original = first.values().next().unwrap().clone();

    let mut changed = cluster("Opel", "Corsa");
    changed.min_price_in_euro_per_month = 349.0;
    changed.vehicle_count = 5;
    let second = apply_at(&mut conn, t1, vec![changed]).unwrap();
    let updated = second.values().next().unwrap();

    // Same row, same validity interval, new values
    assert_eq!(updated.lineage.id, original.lineage.id);
    assert_eq!(updated.lineage.active_from, Some(t0));
    assert_eq!(updated.lineage.active_to, None);
    assert_eq!(updated.lineage.updated_at, Some(t1));
    assert_eq!(updated.min_price_in_euro_per_month, 349.0);
    assert_eq!(updated.vehicle_count, 5);
    assert_ne!(
        updated.lineage.attribute_hash_scd1,
        original.lineage.attribute_hash_scd1
    );
    assert_eq!(
        updated.lineage.attribute_hash_scd2,
        original.lineage.attribute_hash_scd2
    );

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 1);
}

#[test]
fn scd2_change_closes_and_opens_successor() {
    let mut conn = setup();
    let t0 = at(0);
    let t1 = at(1);

    let first = apply_at(&mut conn, t0, vec![cluster("Opel", "Corsa")]).unwrap();
    let original = first.values().next().unwrap().clone();

    let mut changed = cluster("Opel", "Corsa");
    changed.external_fuel_type_id = 3;
    let second = apply_at(&mut conn, t1, vec![changed]).unwrap();
    let successor = second.values().next().unwrap();

    assert_ne!(successor.lineage.id, original.lineage.id);
    assert_eq!(successor.lineage.active_from, Some(t1));
    assert_eq!(successor.lineage.active_to, None);
    assert_eq!(successor.external_fuel_type_id, 3);

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].lineage.active_to, Some(t1));
    assert_eq!(versions[1].lineage.active_to, None);
}

#[test]
fn combined_change_versions_with_fresh_scd1_values() {
    let mut conn = setup();

    apply_at(&mut conn, at(0), vec![cluster("Opel", "Corsa")]).unwrap();

    // Both fingerprints differ; scd2 wins and the successor carries the new
    // scd1 values without a separate in-place update
    let mut changed = cluster("Opel", "Corsa");
    changed.external_fuel_type_id = 3;
    changed.vehicle_count = 9;
    let current = apply_at(&mut conn, at(1), vec![changed]).unwrap();
    let successor = current.values().next().unwrap();
    assert_eq!(successor.vehicle_count, 9);
    assert_eq!(successor.external_fuel_type_id, 3);

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 2);
    // The closed row keeps the values it was closed with
    assert_eq!(versions[0].vehicle_count, 3);
}

#[test]
fn absent_entity_is_closed_without_successor() {
    let mut conn = setup();
    let t1 = at(1);

    apply_at(&mut conn, at(0), vec![cluster("Opel", "Corsa"), cluster("Opel", "Astra")])
        .unwrap();
    apply_at(&mut conn, t1, vec![cluster("Opel", "Corsa")]).unwrap();

    let current = SnapshotStore::current::<VehicleCluster>(&conn).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current.values().next().unwrap().model, "Corsa");

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 2);
    let astra = versions.iter().find(|v| v.model == "Astra").unwrap();
    assert_eq!(astra.lineage.active_to, Some(t1));
}

#[test]
fn version_history_tiles_without_gaps() {
    let mut conn = setup();
    let times = [at(0), at(1), at(2), at(3)];

    // Initial load, then three batches each changing one scd2 field
    for (i, t) in times.iter().enumerate() {
        let mut c = cluster("Opel", "Corsa");
        c.external_fuel_type_id = i as i64 + 1;
        apply_at(&mut conn, *t, vec![c]).unwrap();
    }

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert_eq!(versions.len(), 4);
    for (i, version) in versions.iter().enumerate() {
        assert_eq!(version.lineage.active_from, Some(times[i]));
        assert_eq!(version.lineage.active_to, times.get(i + 1).copied());
    }
    assert!(versions.last().unwrap().lineage.is_active());
}

#[test]
fn duplicate_key_hash_rejects_whole_batch() {
    let mut conn = setup();

    let mut twin = cluster("Opel", "Corsa");
    twin.vehicle_count = 7;
    let err = apply_at(
        &mut conn,
        at(0),
        vec![cluster("Opel", "Corsa"), cluster("Opel", "Astra"), twin],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert!(!err.is_retryable());

    // Nothing reached the store
    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    assert!(versions.is_empty());
}

#[test]
fn empty_batch_is_a_noop() {
    let mut conn = setup();

    apply_at(&mut conn, at(0), vec![cluster("Opel", "Corsa")]).unwrap();
    let current = apply_at::<VehicleCluster>(&mut conn, at(1), vec![]).unwrap();
    assert!(current.is_empty());

    // The existing entity is untouched, not closed
    let stored = SnapshotStore::current::<VehicleCluster>(&conn).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored.values().next().unwrap().lineage.is_active());
}

#[test]
fn mixed_batch_applies_every_transition() {
    let mut conn = setup();
    let t1 = at(1);

    apply_at(
        &mut conn,
        at(0),
        vec![
            cluster("Opel", "Corsa"),
            cluster("Opel", "Astra"),
            cluster("Peugeot", "208"),
        ],
    )
    .unwrap();

    // Corsa: scd1 change. Astra: scd2 change. 208: dropped. e-2008: new.
    let mut corsa = cluster("Opel", "Corsa");
    corsa.vehicle_count = 11;
    let mut astra = cluster("Opel", "Astra");
    astra.external_fuel_type_id = 3;
    let current = apply_at(
        &mut conn,
        t1,
        vec![corsa, astra, cluster("Peugeot", "e-2008")],
    )
    .unwrap();
    assert_eq!(current.len(), 3);

    let stored = SnapshotStore::current::<VehicleCluster>(&conn).unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.values().all(|c| c.model != "208"));

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    // 3 initial rows + astra successor + e-2008
    assert_eq!(versions.len(), 5);
    let closed: Vec<&VehicleCluster> =
        versions.iter().filter(|v| !v.lineage.is_active()).collect();
    assert_eq!(closed.len(), 2);
    assert!(closed.iter().all(|v| v.lineage.active_to == Some(t1)));
}

#[test]
fn readback_mismatch_is_fatal() {
    let mut conn = setup();

    // Sabotage the read-back: rows for this make are closed the moment they
    // are written, so the batch can never be reloaded in full
    conn.execute_batch(
        "CREATE TRIGGER close_phantom AFTER INSERT ON vehicle_cluster
         WHEN new.make = 'Phantom'
         BEGIN
             UPDATE vehicle_cluster SET active_to = new.active_from WHERE id = new.id;
         END",
    )
    .unwrap();

    // Five distinct entities, one of which vanishes on read-back
    let batch = vec![
        cluster("Opel", "Corsa"),
        cluster("Opel", "Astra"),
        cluster("Kia", "Niro"),
        cluster("Peugeot", "208"),
        cluster("Phantom", "X"),
    ];
    let err = apply_at(&mut conn, at(0), batch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(!err.is_retryable());
}

#[test]
fn one_timestamp_per_batch() {
    let mut conn = setup();
    let t1 = at(1);

    apply_at(&mut conn, at(0), vec![cluster("Opel", "Corsa"), cluster("Opel", "Astra")])
        .unwrap();

    let mut corsa = cluster("Opel", "Corsa");
    corsa.external_fuel_type_id = 3;
    let mut astra = cluster("Opel", "Astra");
    astra.external_fuel_type_id = 3;
    apply_at(&mut conn, t1, vec![corsa, astra]).unwrap();

    let versions = SnapshotStore::all_versions::<VehicleCluster>(&conn).unwrap();
    for v in &versions {
        match v.lineage.active_to {
            Some(closed_at) => assert_eq!(closed_at, t1),
            None => assert_eq!(v.lineage.active_from, Some(t1)),
        }
    }
}

#[test]
fn key_hash_matches_identity_module() {
    let mut conn = setup();

    let corsa = cluster("Opel", "Corsa");
    let expected = identity::key_hash(&corsa);
    let current = apply_at(&mut conn, at(0), vec![corsa]).unwrap();
    assert!(current.contains_key(&expected));
    assert_eq!(
        current[&expected].lineage.key_hash.as_deref(),
        Some(expected.as_str())
    );
}
