// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{cid, clock, color, eventually, fast_config, ids, pid, warm_records};
use sw_adapters::{FakeRemoteAdapter, SessionSignal};
use sw_core::{FakeClock, Operation, RecordKey};
use sw_storage::{FakeBackend, StorageBackend};

type TestCoordinator = Coordinator<FakeBackend, FakeRemoteAdapter, FakeClock>;

struct Harness {
    backend: FakeBackend,
    adapter: FakeRemoteAdapter,
    session: SessionSignal,
    coordinator: TestCoordinator,
}

async fn harness() -> Harness {
    let backend = FakeBackend::new();
    for record in warm_records() {
        backend.seed(record).await;
    }
    let adapter = FakeRemoteAdapter::new();
    let session = SessionSignal::default();
    let coordinator = Coordinator::new(
        CacheStore::new(clock()),
        DurableStore::new(backend.clone()),
        RemoteStore::new(adapter.clone(), session.clone()),
        StrategyTable::default(),
        fast_config(),
    );
    Harness {
        backend,
        adapter,
        session,
        coordinator,
    }
}

fn delete_b() -> Vec<Operation> {
    vec![
        Operation::remove_from_relationship(&pid("p"), &cid("b")),
        Operation::set_color_order(&pid("p"), ids(&["a", "c"])),
    ]
}

async fn stored_order(backend: &FakeBackend) -> Option<Vec<sw_core::ColorId>> {
    backend
        .get(&RecordKey::palette(&pid("p")))
        .await
        .ok()
        .flatten()
        .and_then(|r| r.as_palette().map(|p| p.color_order.clone()))
}

#[tokio::test]
async fn activate_seeds_cache_from_durable() {
    let h = harness().await;
    h.coordinator.activate().await.unwrap();
    assert_eq!(h.coordinator.cache().snapshot().palettes.len(), 2);
    assert_eq!(h.coordinator.status().remote, RemoteStatus::Inactive);
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn commits_reach_durable_storage() {
    let h = harness().await;
    h.coordinator.activate().await.unwrap();
    h.coordinator
        .cache()
        .update(delete_b(), Origin::Local)
        .await
        .unwrap();

    h.coordinator.deactivate().await;

    assert_eq!(stored_order(&h.backend).await, Some(ids(&["a", "c"])));
    assert_eq!(h.coordinator.durable().pending(), 0);
}

#[tokio::test]
async fn persistence_degrades_then_recovers() {
    let h = harness().await;
    h.coordinator.activate().await.unwrap();
    h.backend.set_unavailable(true);

    h.coordinator
        .cache()
        .update(delete_b(), Origin::Local)
        .await
        .unwrap();

    eventually(|| h.coordinator.status().is_degraded()).await;
    assert!(h.backend.write_attempts() >= 3);
    h.backend.set_unavailable(false);
    eventually(|| h.coordinator.status().persistence == PersistenceStatus::Healthy).await;
    assert_eq!(stored_order(&h.backend).await, Some(ids(&["a", "c"])));
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn synchronize_requires_activation_and_session() {
    let h = harness().await;
    assert!(matches!(
        h.coordinator.synchronize().await,
        Err(RuntimeError::NotActivated)
    ));
    h.coordinator.activate().await.unwrap();
    assert!(matches!(
        h.coordinator.synchronize().await,
        Err(RuntimeError::NotAuthenticated)
    ));
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn synchronize_pushes_local_and_then_propagates() {
    let h = harness().await;
    h.session.login("token");
    h.coordinator.activate().await.unwrap();
    assert_eq!(h.coordinator.status().remote, RemoteStatus::Ready);

    let report = h.coordinator.synchronize().await.unwrap();
    assert_eq!(report.pulled, 0);
    assert_eq!(report.pushed, 5);
    assert_eq!(h.coordinator.status().remote, RemoteStatus::Active);

    h.coordinator
        .cache()
        .update(delete_b(), Origin::Local)
        .await
        .unwrap();
    let adapter = h.adapter.clone();
    eventually(move || {
        adapter
            .state()
            .palette(&pid("p"))
            .is_some_and(|p| p.color_order == ids(&["a", "c"]))
    })
    .await;
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn auth_expiry_deactivates_remote_without_touching_cache() {
    let h = harness().await;
    h.session.login("token");
    h.coordinator.activate().await.unwrap();
    h.coordinator.synchronize().await.unwrap();
    h.adapter.expire_token("token");

    h.coordinator
        .cache()
        .update(delete_b(), Origin::Local)
        .await
        .unwrap();

    eventually(|| {
        matches!(
            h.coordinator.status().remote,
            RemoteStatus::Deactivated { .. }
        )
    })
    .await;
    assert_eq!(
        h.coordinator
            .cache()
            .read(|s| s.palette(&pid("p")).unwrap().color_order.clone()),
        ids(&["a", "c"])
    );
    assert!(!h.coordinator.remote().is_active());
    h.coordinator.deactivate().await;
}

fn validation_error() -> RemoteError {
    RemoteError::rejected(sw_core::RejectReason::Validation("bad".into()))
}

#[tokio::test]
async fn validation_rejections_are_retried() {
    let h = harness().await;
    h.session.login("token");
    h.coordinator.activate().await.unwrap();
    h.coordinator.synchronize().await.unwrap();
    h.adapter.fail_next(validation_error());

    h.coordinator
        .cache()
        .update(vec![Operation::add_record(color("x", 9))], Origin::Local)
        .await
        .unwrap();

    let adapter = h.adapter.clone();
    eventually(move || adapter.state().color(&cid("x")).is_some()).await;
    eventually(|| h.coordinator.status().remote == RemoteStatus::Active).await;
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn persistent_rejections_are_reported_then_abandoned() {
    let h = harness().await;
    h.session.login("token");
    h.coordinator.activate().await.unwrap();
    h.coordinator.synchronize().await.unwrap();
    for _ in 0..5 {
        h.adapter.fail_next(validation_error());
    }

    h.coordinator
        .cache()
        .update(vec![Operation::add_record(color("x", 9))], Origin::Local)
        .await
        .unwrap();

    eventually(|| {
        matches!(
            h.coordinator.status().remote,
            RemoteStatus::Failed { .. }
        )
    })
    .await;
    assert!(h.adapter.update_count() >= 5);
    assert!(h.adapter.state().color(&cid("x")).is_none());

    h.coordinator
        .cache()
        .update(vec![Operation::add_record(color("y", 9))], Origin::Local)
        .await
        .unwrap();
    let adapter = h.adapter.clone();
    eventually(move || adapter.state().color(&cid("y")).is_some()).await;
    assert!(h.adapter.state().color(&cid("x")).is_none());
    eventually(|| h.coordinator.status().remote == RemoteStatus::Active).await;
    h.coordinator.deactivate().await;
}

#[tokio::test]
async fn log_is_compacted_once_absorbed() {
    let h = harness().await;
    h.coordinator.activate().await.unwrap();
    h.coordinator
        .cache()
        .update(delete_b(), Origin::Local)
        .await
        .unwrap();
    eventually(|| h.coordinator.cache().log_len() == 0).await;
    h.coordinator.deactivate().await;
}
