use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use duebook_core::{DebtDraft, DebtService, SyncStore};
use duebook_domain::Ledger;
use duebook_storage_json::JsonSyncStore;
use tempfile::TempDir;

fn store() -> (TempDir, JsonSyncStore) {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonSyncStore::new(temp.path().join("sync")).expect("create store");
    (temp, store)
}

fn sample_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    DebtService::add(
        &mut ledger,
        DebtDraft::new(
            "Budi",
            500_000.0,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ),
    )
    .expect("add debt");
    ledger
}

#[test]
fn write_then_load_round_trips_the_snapshot() {
    let (_guard, store) = store();
    let ledger = sample_ledger();

    store.write("budi-2024", &ledger).expect("write snapshot");
    assert!(store.exists("budi-2024"));

    let loaded = store.load("budi-2024").expect("load").expect("present");
    assert_eq!(loaded, ledger);
}

#[test]
fn unknown_keys_load_as_absent() {
    let (_guard, store) = store();
    assert!(!store.exists("nobody"));
    assert!(store.load("nobody").expect("load").is_none());
}

#[test]
fn subscribe_fires_immediately_with_existing_state() {
    let (_guard, store) = store();
    let ledger = sample_ledger();
    store.write("budi-2024", &ledger).expect("write snapshot");

    let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store
        .subscribe(
            "budi-2024",
            Box::new(move |snapshot, exists| {
                sink.lock().unwrap().push((snapshot.is_some(), exists));
            }),
        )
        .expect("subscribe");

    assert_eq!(seen.lock().unwrap().as_slice(), &[(true, true)]);
}

#[test]
fn brand_new_keys_report_absent_not_error() {
    let (_guard, store) = store();

    let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store
        .subscribe(
            "fresh-key",
            Box::new(move |snapshot, exists| {
                sink.lock().unwrap().push((snapshot.is_some(), exists));
            }),
        )
        .expect("subscribe");

    assert_eq!(seen.lock().unwrap().as_slice(), &[(false, false)]);
}

#[test]
fn writes_push_updates_to_subscribers() {
    let (_guard, store) = store();

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store
        .subscribe(
            "budi-2024",
            Box::new(move |snapshot, _exists| {
                sink.lock()
                    .unwrap()
                    .push(snapshot.map(|l| l.debts.len()).unwrap_or(0));
            }),
        )
        .expect("subscribe");

    store.write("budi-2024", &sample_ledger()).expect("write");

    // initial fire with no document, then the pushed write
    assert_eq!(seen.lock().unwrap().as_slice(), &[0, 1]);
}

#[test]
fn cancelled_subscriptions_stop_receiving_updates() {
    let (_guard, store) = store();

    let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store
        .subscribe(
            "budi-2024",
            Box::new(move |snapshot, _exists| {
                sink.lock().unwrap().push(snapshot.is_some());
            }),
        )
        .expect("subscribe");

    subscription.cancel();
    store.write("budi-2024", &sample_ledger()).expect("write");

    assert_eq!(seen.lock().unwrap().as_slice(), &[false]);
}

#[test]
fn corrupt_documents_surface_as_brand_new_keys() {
    let (_guard, store) = store();
    std::fs::write(store.document_path("broken"), b"not json").expect("seed corrupt file");

    let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = store
        .subscribe(
            "broken",
            Box::new(move |snapshot, exists| {
                sink.lock().unwrap().push((snapshot.is_some(), exists));
            }),
        )
        .expect("subscribe");

    assert_eq!(seen.lock().unwrap().as_slice(), &[(false, false)]);
}
