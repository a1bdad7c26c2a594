// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{cid, clock, ids, pid, warm_records};
use std::sync::Arc;
use sw_core::FakeClock;

fn setup(depth: usize) -> (CacheStore<FakeClock>, Arc<UndoManager>) {
    let cache = CacheStore::new(clock());
    cache.seed(warm_records());
    let undo = Arc::new(UndoManager::new(depth));
    undo.track(&cache.snapshot());
    cache.observe(undo.clone());
    (cache, undo)
}

fn order(cache: &CacheStore<FakeClock>) -> Vec<ColorId> {
    cache.read(|s| s.palette(&pid("p")).unwrap().color_order.clone())
}

async fn set_order(cache: &CacheStore<FakeClock>, order: &[&str]) {
    let p = pid("p");
    let current: BTreeSet<ColorId> = cache.read(|s| s.palette(&p).unwrap().colors.clone());
    let wanted: BTreeSet<ColorId> = ids(order).into_iter().collect();
    let mut ops = Vec::new();
    for c in current.difference(&wanted) {
        ops.push(Operation::remove_from_relationship(&p, c));
    }
    for c in wanted.difference(&current) {
        ops.push(Operation::add_to_relationship(&p, c));
    }
    ops.push(Operation::set_color_order(&p, ids(order)));
    cache.update(ops, Origin::Local).await.unwrap();
}

#[tokio::test]
async fn fresh_palette_has_nothing_to_undo() {
    let (cache, undo) = setup(10);
    assert_eq!(undo.state(&pid("p")), UndoState::Clean);
    assert_eq!(
        undo.undo(&cache, &pid("p")).await.unwrap_err(),
        UndoError::NothingToUndo
    );
    assert_eq!(
        undo.redo(&cache, &pid("p")).await.unwrap_err(),
        UndoError::NothingToRedo
    );
}

#[tokio::test]
async fn undo_then_redo_round_trips() {
    let (cache, undo) = setup(10);
    set_order(&cache, &["c", "a", "b"]).await;
    set_order(&cache, &["c", "a"]).await;
    assert_eq!(undo.state(&pid("p")), UndoState::Dirty { cursor: 2 });

    undo.undo(&cache, &pid("p")).await.unwrap();
    assert_eq!(order(&cache), ids(&["c", "a", "b"]));
    undo.undo(&cache, &pid("p")).await.unwrap();
    assert_eq!(order(&cache), ids(&["a", "b", "c"]));
    assert!(!undo.can_undo(&pid("p")));

    undo.redo(&cache, &pid("p")).await.unwrap();
    undo.redo(&cache, &pid("p")).await.unwrap();
    assert_eq!(order(&cache), ids(&["c", "a"]));
    assert!(!undo.can_redo(&pid("p")));
}

#[tokio::test]
async fn new_change_discards_redo_history() {
    let (cache, undo) = setup(10);
    set_order(&cache, &["b", "a", "c"]).await;
    undo.undo(&cache, &pid("p")).await.unwrap();
    assert!(undo.can_redo(&pid("p")));

    set_order(&cache, &["c", "b", "a"]).await;

    assert!(!undo.can_redo(&pid("p")));
    assert_eq!(undo.checkpoints(&pid("p")).len(), 2);
}

#[tokio::test]
async fn depth_evicts_oldest_checkpoints() {
    let (cache, undo) = setup(2);
    set_order(&cache, &["b", "a", "c"]).await;
    set_order(&cache, &["b", "c", "a"]).await;
    set_order(&cache, &["c", "b", "a"]).await;

    assert_eq!(undo.checkpoints(&pid("p")).len(), 3);
    undo.undo(&cache, &pid("p")).await.unwrap();
    undo.undo(&cache, &pid("p")).await.unwrap();
    assert_eq!(order(&cache), ids(&["b", "a", "c"]));
    assert_eq!(
        undo.undo(&cache, &pid("p")).await.unwrap_err(),
        UndoError::NothingToUndo
    );
}

#[tokio::test]
async fn restore_resurrects_deleted_colors() {
    let (cache, undo) = setup(10);
    let p = pid("p");
    // Drop b from both palettes so it becomes an orphan and is deleted
    cache
        .update(
            vec![
                Operation::remove_from_relationship(&pid("history"), &cid("b")),
                Operation::set_color_order(&pid("history"), ids(&["c", "a"])),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    cache
        .update(
            vec![
                Operation::remove_from_relationship(&p, &cid("b")),
                Operation::set_color_order(&p, ids(&["a", "c"])),
                Operation::remove_record(RecordKey::color(&cid("b"))),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    assert!(cache.read(|s| s.color(&cid("b")).is_none()));

    undo.undo(&cache, &p).await.unwrap();
    assert_eq!(order(&cache), ids(&["a", "b", "c"]));
    assert!(cache.read(|s| s.color(&cid("b")).is_some()));

    undo.redo(&cache, &p).await.unwrap();
    assert_eq!(order(&cache), ids(&["a", "c"]));
    assert!(cache.read(|s| s.color(&cid("b")).is_none()));
}

#[tokio::test]
async fn restoring_a_locked_palette_is_rejected() {
    let (cache, undo) = setup(10);
    set_order(&cache, &["b", "a", "c"]).await;
    cache
        .update(
            vec![Operation::update_attribute(
                RecordKey::palette(&pid("p")),
                Attribute::IsLocked(true),
            )],
            Origin::Local,
        )
        .await
        .unwrap();

    let err = undo.undo(&cache, &pid("p")).await.unwrap_err();
    assert!(matches!(err, UndoError::Rejected(_)));
    assert_eq!(order(&cache), ids(&["b", "a", "c"]));
    assert!(undo.can_undo(&pid("p")));
}

#[tokio::test]
async fn deleting_a_palette_can_be_undone() {
    let (cache, undo) = setup(10);
    let p = pid("p");
    cache
        .update(
            vec![
                Operation::update_attribute(RecordKey::palette(&p), Attribute::IsFavorite(true)),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    set_order(&cache, &["b", "a", "c"]).await;
    cache
        .update(vec![Operation::remove_record(RecordKey::palette(&p))], Origin::Local)
        .await
        .unwrap();
    assert!(cache.read(|s| s.palette(&p).is_none()));
    assert!(undo.checkpoints(&p).last().unwrap().removed);

    undo.undo(&cache, &p).await.unwrap();
    let restored = cache.read(|s| s.palette(&p).cloned()).unwrap();
    assert_eq!(restored.color_order, ids(&["b", "a", "c"]));
    assert!(restored.is_favorite);

    undo.undo(&cache, &p).await.unwrap();
    assert_eq!(order(&cache), ids(&["a", "b", "c"]));

    undo.redo(&cache, &p).await.unwrap();
    undo.redo(&cache, &p).await.unwrap();
    assert!(cache.read(|s| s.palette(&p).is_none()));
    assert!(!undo.can_redo(&p));
}

#[tokio::test]
async fn remote_removals_drop_the_history() {
    let (cache, undo) = setup(10);
    set_order(&cache, &["b", "a", "c"]).await;
    cache
        .update(
            vec![Operation::remove_record(RecordKey::palette(&pid("p")))],
            Origin::Remote,
        )
        .await
        .unwrap();
    assert!(undo.checkpoints(&pid("p")).is_empty());
}

#[tokio::test]
async fn graveyard_forgets_colors_no_checkpoint_needs() {
    let (cache, undo) = setup(1);
    let p = pid("p");
    cache
        .update(
            vec![
                Operation::remove_from_relationship(&pid("history"), &cid("b")),
                Operation::set_color_order(&pid("history"), ids(&["c", "a"])),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    cache
        .update(
            vec![
                Operation::remove_from_relationship(&p, &cid("b")),
                Operation::set_color_order(&p, ids(&["a", "c"])),
                Operation::remove_record(RecordKey::color(&cid("b"))),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    assert_eq!(undo.graveyard_len(), 1);

    // Depth 1: the next step evicts every checkpoint that listed b
    set_order(&cache, &["c", "a"]).await;
    cache
        .update(
            vec![
                Operation::remove_from_relationship(&pid("history"), &cid("a")),
                Operation::set_color_order(&pid("history"), ids(&["c"])),
            ],
            Origin::Local,
        )
        .await
        .unwrap();
    assert_eq!(undo.graveyard_len(), 0);
}
