// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{FakeBackend, StorageCall};
use chrono::Utc;
use sw_core::Palette;

#[tokio::test]
async fn delegates_to_inner_backend() {
    let fake = FakeBackend::new();
    let traced = TracedBackend::new(fake.clone());
    let palette: Record = Palette::new("p-1", "Dusk", Utc::now()).into();

    traced.put(&palette).await.unwrap();
    assert!(traced.get(&palette.key()).await.unwrap().is_some());
    traced.delete(&palette.key()).await.unwrap();
    assert!(traced.list_all().await.unwrap().is_empty());

    let calls = fake.calls();
    assert!(matches!(calls[0], StorageCall::Put { .. }));
    assert!(matches!(calls.last(), Some(StorageCall::ListAll)));
}

#[tokio::test]
async fn passes_errors_through() {
    let fake = FakeBackend::new();
    fake.fail_next_writes(1);
    let traced = TracedBackend::new(fake);
    let palette: Record = Palette::new("p-1", "Dusk", Utc::now()).into();

    assert!(matches!(
        traced.put(&palette).await,
        Err(StorageError::Unavailable(_))
    ));
    assert!(traced.put(&palette).await.is_ok());
}
