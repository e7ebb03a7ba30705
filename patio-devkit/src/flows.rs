//! Flow tests: the composed `Patio` exercised through the stub transport.

use crate::builders::{draft, remote_motorcycle};
use crate::transport_stub::{StubOutcome, StubTransport};
use parking_lot::Mutex;
use patio_core::config::{ApiConf, GridConf, PatioConfig, StorageConf};
use patio_core::{
    ErrorKind, MessageOverrides, Patio, StoreError, StoreEvent, TransportFailure,
};
use std::sync::Arc;
use tempfile::TempDir;

fn config(dir: &TempDir, columns: u32, rows: u32) -> PatioConfig {
    PatioConfig {
        api: ApiConf {
            base_url: "http://yard.test".into(),
            timeout_secs: 5,
        },
        storage: StorageConf {
            data_dir: dir.path().display().to_string(),
        },
        grid: GridConf { columns, rows },
    }
}

async fn patio(dir: &TempDir, columns: u32, rows: u32) -> (Patio, Arc<StubTransport>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let stub = Arc::new(StubTransport::new());
    let patio = Patio::open_with_transport(
        &config(dir, columns, rows),
        stub.clone(),
        MessageOverrides::new(),
    )
    .await
    .unwrap();
    patio.records.set_session(Some("bearer-abc".into()));
    (patio, stub)
}

#[tokio::test]
async fn test_unauthenticated_mutation_never_reaches_the_wire() {
    let dir = TempDir::new().unwrap();
    let (patio, stub) = patio(&dir, 8, 8).await;
    patio.records.set_session(None);

    let err = patio.records.create(&draft("ABC1234")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_bearer_credential_rides_every_call() {
    let dir = TempDir::new().unwrap();
    let (patio, stub) = patio(&dir, 8, 8).await;
    stub.push(StubOutcome::Fleet(vec![]));

    patio.records.list().await.unwrap();
    assert_eq!(stub.calls()[0].token, "bearer-abc");
}

#[tokio::test]
async fn test_offline_flip_mid_session() {
    let dir = TempDir::new().unwrap();
    let (patio, stub) = patio(&dir, 8, 8).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    patio.events.subscribe(move |event| sink.lock().push(event.clone()));

    // healthy online read first
    stub.push(StubOutcome::Fleet(vec![remote_motorcycle("1", "AAA1111")]));
    assert_eq!(patio.records.list().await.unwrap().len(), 1);

    // gateway goes down: the failing call surfaces its classified error,
    // the process flips offline for everything after it
    stub.fail_next(TransportFailure::Status {
        code: 503,
        message: None,
    });
    let err = patio.records.create(&draft("BBB2222")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    assert!(!patio.connectivity.is_online());
    assert!(seen.lock().contains(&StoreEvent::WentOffline));

    // subsequent create routes to the local mirror, no wire call
    let calls_before = stub.call_count();
    let local = patio.records.create(&draft("BBB2222")).await.unwrap();
    assert!(local.id.starts_with("local_"));
    assert_eq!(stub.call_count(), calls_before);

    // offline list serves mirror: server record plus the local one
    let listed = patio.records.list().await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn test_return_to_online_is_manual_only() {
    let dir = TempDir::new().unwrap();
    let (patio, stub) = patio(&dir, 8, 8).await;
    patio.connectivity.set_offline();

    // offline reads succeed without resetting the flag
    patio.records.list().await.unwrap();
    assert!(!patio.connectivity.is_online());

    patio.connectivity.set_online();
    stub.push(StubOutcome::Fleet(vec![remote_motorcycle("1", "AAA1111")]));
    assert_eq!(patio.records.list().await.unwrap().len(), 1);
    assert_eq!(stub.calls().last().unwrap().op, "fetch_all");
}

#[tokio::test]
async fn test_place_and_record_couples_grid_and_record() {
    let dir = TempDir::new().unwrap();
    let (patio, _stub) = patio(&dir, 4, 4).await;
    patio.connectivity.set_offline();

    let created = patio.records.create(&draft("ABC1234")).await.unwrap();
    let placed = patio.place_and_record(&created, 1, 1).await.unwrap();

    assert_eq!(placed.position.map(|p| (p.x, p.y)), Some((1, 1)));
    assert!(patio.grid.is_occupied(1, 1).await);
    // the stored record carries the same position
    let stored = patio.records.get(&created.id).await.unwrap();
    assert_eq!(stored.position.map(|p| (p.x, p.y)), Some((1, 1)));

    // move: old cell vacated, record follows
    let moved = patio.place_and_record(&placed, 2, 3).await.unwrap();
    assert!(!patio.grid.is_occupied(1, 1).await);
    assert!(patio.grid.is_occupied(2, 3).await);
    assert_eq!(moved.position.map(|p| (p.x, p.y)), Some((2, 3)));
}

#[tokio::test]
async fn test_strict_placement_rejects_occupied_cell() {
    let dir = TempDir::new().unwrap();
    let (patio, _stub) = patio(&dir, 2, 2).await;
    patio.connectivity.set_offline();

    let a = patio.records.create(&draft("ABC1234")).await.unwrap();
    let b = patio.records.create(&draft("XYZ9876")).await.unwrap();
    patio.place_and_record(&a, 1, 1).await.unwrap();

    let err = patio.place_and_record(&b, 1, 1).await.unwrap_err();
    assert!(matches!(err, StoreError::OccupiedCell { x: 1, y: 1 }));
    // grid unchanged: A still holds the cell, B is nowhere
    assert_eq!(
        patio.grid.cell(1, 1).await.unwrap().motorcycle.unwrap().id,
        a.id
    );
    assert!(patio.grid.position_of(&b.id).await.is_none());
}

#[tokio::test]
async fn test_delete_and_clear_leaves_no_dangling_cell() {
    let dir = TempDir::new().unwrap();
    let (patio, _stub) = patio(&dir, 4, 4).await;
    patio.connectivity.set_offline();

    let created = patio.records.create(&draft("ABC1234")).await.unwrap();
    patio.place_and_record(&created, 0, 0).await.unwrap();

    patio.delete_and_clear(&created.id).await.unwrap();
    assert!(!patio.grid.is_occupied(0, 0).await);
    assert!(patio.records.get(&created.id).await.is_none());
    assert!(patio.records.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_feed_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let (patio, _stub) = patio(&dir, 4, 4).await;
    patio.connectivity.set_offline();

    let created = patio.records.create(&draft("ABC1234")).await.unwrap();
    patio.place_and_record(&created, 0, 0).await.unwrap();
    patio.delete_and_clear(&created.id).await.unwrap();

    let entries = patio.history.entries().await;
    // create, place, update (position), remove, delete
    assert_eq!(entries.len(), 5);
    assert!(entries
        .windows(2)
        .all(|w| w[0].timestamp_ms >= w[1].timestamp_ms));
    assert!(entries.iter().any(|e| e.action == "create"));
    assert!(entries.iter().any(|e| e.action == "place"));
    assert!(entries.iter().any(|e| e.action == "delete"));
}

#[tokio::test]
async fn test_mutations_notify_subscribers() {
    let dir = TempDir::new().unwrap();
    let (patio, _stub) = patio(&dir, 4, 4).await;
    patio.connectivity.set_offline();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = patio
        .events
        .subscribe(move |event| sink.lock().push(event.clone()));

    let created = patio.records.create(&draft("ABC1234")).await.unwrap();
    patio.grid.place(&created, 2, 2).await.unwrap();

    {
        let events = seen.lock();
        assert!(events.contains(&StoreEvent::Created {
            id: created.id.clone()
        }));
        assert!(events.contains(&StoreEvent::Placed {
            id: created.id.clone(),
            x: 2,
            y: 2
        }));
    }

    patio.events.unsubscribe(subscription);
    let before = seen.lock().len();
    patio.grid.remove(&created.id).await.unwrap();
    assert_eq!(seen.lock().len(), before);
}

#[tokio::test]
async fn test_conflict_message_override_surfaces_to_caller() {
    let dir = TempDir::new().unwrap();
    let stub = Arc::new(StubTransport::new());
    let patio = Patio::open_with_transport(
        &config(&dir, 8, 8),
        stub.clone(),
        MessageOverrides::new().set(409, "placa ja cadastrada"),
    )
    .await
    .unwrap();
    patio.records.set_session(Some("bearer-abc".into()));

    stub.fail_next(TransportFailure::Status {
        code: 409,
        message: Some("duplicate key".into()),
    });
    let err = patio.records.create(&draft("ABC1234")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "placa ja cadastrada");
    assert!(patio.connectivity.is_online());
}
