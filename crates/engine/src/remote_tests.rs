// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::cache::CacheStore;
use crate::test_support::{clock, color, warm_records};
use sw_adapters::FakeRemoteAdapter;
use sw_core::{Origin, RecordKey};

fn store(token: Option<&str>) -> (FakeRemoteAdapter, RemoteStore<FakeRemoteAdapter>) {
    let adapter = FakeRemoteAdapter::new();
    adapter.seed(warm_records());
    let session = SessionSignal::default();
    if let Some(token) = token {
        session.login(token);
    }
    (adapter.clone(), RemoteStore::new(adapter, session))
}

#[test]
fn activate_requires_a_session() {
    let (_, remote) = store(None);
    assert!(!remote.activate());
    assert_eq!(remote.state(), RemoteState::Inactive);

    remote.session().login("t");
    assert!(remote.activate());
    assert_eq!(remote.state(), RemoteState::Ready);
}

#[tokio::test]
async fn calls_without_token_are_auth_expired() {
    let (_, remote) = store(None);
    let err = remote.query_all().await.unwrap_err();
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn propagate_sends_one_call_per_transaction() {
    let (adapter, remote) = store(Some("t"));
    remote.mark_active(0);
    let cache = CacheStore::new(clock());
    cache.seed(warm_records());

    let mut entries = cache
        .update(vec![Operation::add_record(color("x", 7))], Origin::Local)
        .await
        .unwrap();
    entries.extend(
        cache
            .update(vec![Operation::add_record(color("y", 8))], Origin::Local)
            .await
            .unwrap(),
    );

    let sent = remote.propagate(&entries, |_| true).await.unwrap();

    assert_eq!(sent, 2);
    assert_eq!(adapter.update_count(), 2);
    assert_eq!(remote.watermark().0, entries[1].seq);
    assert!(adapter.state().contains(&RecordKey::color(&"y".into())));

    // Already past the watermark
    assert_eq!(remote.propagate(&entries, |_| true).await.unwrap(), 0);
}

#[tokio::test]
async fn unadmitted_entries_advance_the_watermark_without_a_call() {
    let (adapter, remote) = store(Some("t"));
    remote.mark_active(0);
    let cache = CacheStore::new(clock());
    let entries = cache
        .update(vec![Operation::add_record(color("x", 7))], Origin::Remote)
        .await
        .unwrap();

    let sent = remote
        .propagate(&entries, |e| e.origin != Origin::Remote)
        .await
        .unwrap();

    assert_eq!(sent, 0);
    assert_eq!(adapter.update_count(), 0);
    assert_eq!(remote.watermark().0, entries[0].seq);
}

#[tokio::test]
async fn failed_transaction_stays_pending() {
    let (adapter, remote) = store(Some("t"));
    remote.mark_active(0);
    let cache = CacheStore::new(clock());
    let entries = cache
        .update(vec![Operation::add_record(color("x", 7))], Origin::Local)
        .await
        .unwrap();
    adapter.fail_next(RemoteError::Network("offline".into()));

    assert!(remote.propagate(&entries, |_| true).await.is_err());
    assert_eq!(remote.watermark().0, 0);

    assert_eq!(remote.propagate(&entries, |_| true).await.unwrap(), 1);
}
