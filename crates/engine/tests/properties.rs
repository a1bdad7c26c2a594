// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests over random action sequences

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{clock, config, palette_p, pid};
use proptest::prelude::*;
use sw_adapters::{NoOpRemoteAdapter, SessionSignal};
use sw_core::{FakeClock, MaterializedState, PaletteId, Rgba, SequentialIdGen};
use sw_engine::{MoveRequest, Runtime, RuntimeDeps};
use sw_storage::{MemoryBackend, StorageBackend};

type TestRuntime = Runtime<MemoryBackend, NoOpRemoteAdapter, FakeClock, SequentialIdGen>;

#[derive(Debug, Clone)]
enum Action {
    Add { shade: u8, into_p: bool },
    Delete { index: usize },
    Move { from: usize, to: usize },
    FromHistory { index: usize, to: usize },
    Lock(bool),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (any::<u8>(), any::<bool>()).prop_map(|(shade, into_p)| Action::Add { shade, into_p }),
        (0usize..8).prop_map(|index| Action::Delete { index }),
        (0usize..8, 0usize..8).prop_map(|(from, to)| Action::Move { from, to }),
        (0usize..8, 0usize..8).prop_map(|(index, to)| Action::FromHistory { index, to }),
        any::<bool>().prop_map(Action::Lock),
    ]
}

async fn runtime() -> TestRuntime {
    let backend = MemoryBackend::new();
    for record in palette_p() {
        backend.put(&record).await.unwrap();
    }
    let runtime = Runtime::new(
        RuntimeDeps {
            backend,
            remote: NoOpRemoteAdapter,
            session: SessionSignal::default(),
        },
        clock(),
        SequentialIdGen::new("id"),
        config(),
    );
    runtime.activate().await.unwrap();
    runtime
}

/// Apply one action; rejected actions are part of the exercise
async fn perform(runtime: &TestRuntime, action: &Action) {
    let p = pid("p");
    let history = runtime
        .snapshot()
        .color_history()
        .map(|h| h.id.clone())
        .unwrap();
    let colors = runtime
        .snapshot()
        .palette(&p)
        .map(|p| p.color_order.clone())
        .unwrap_or_default();
    let _ = match action {
        Action::Add { shade, into_p } => runtime
            .add_color(
                Rgba::opaque(*shade, 0, 0),
                "c",
                into_p.then_some(&p),
            )
            .await
            .map(|_| ()),
        Action::Delete { index } => match colors.get(*index) {
            Some(color) => runtime.delete_color(&p, color).await.map(|_| ()),
            None => Ok(()),
        },
        Action::Move { from, to } => runtime
            .move_color(&MoveRequest {
                source: p.clone(),
                source_index: *from,
                target: p.clone(),
                target_index: *to,
            })
            .await
            .map(|_| ()),
        Action::FromHistory { index, to } => runtime
            .move_color(&MoveRequest {
                source: history,
                source_index: *index,
                target: p.clone(),
                target_index: *to,
            })
            .await
            .map(|_| ()),
        Action::Lock(locked) => runtime.set_locked(&p, *locked).await.map(|_| ()),
    };
}

fn orders_match(state: &MaterializedState) -> bool {
    state.palettes.values().all(|p| {
        let ordered: std::collections::BTreeSet<_> = p.color_order.iter().cloned().collect();
        ordered == p.colors && ordered.len() == p.color_order.len()
    })
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn color_order_always_matches_colors(actions in prop::collection::vec(action(), 1..24)) {
        let ok = block_on(async {
            let runtime = runtime().await;
            let mut ok = orders_match(&runtime.snapshot());
            for action in &actions {
                perform(&runtime, action).await;
                ok &= orders_match(&runtime.snapshot());
            }
            runtime.deactivate().await;
            ok
        });
        prop_assert!(ok);
    }

    #[test]
    fn undo_then_redo_restores_order(actions in prop::collection::vec(action(), 1..12)) {
        let p: PaletteId = pid("p");
        let (before, after) = block_on(async {
            let runtime = runtime().await;
            for action in &actions {
                perform(&runtime, action).await;
            }
            let order = |runtime: &TestRuntime| {
                runtime.snapshot().palette(&p).map(|p| p.color_order.clone())
            };
            let before = order(&runtime);
            let after = if runtime.undo(&p).await.is_ok() {
                runtime.redo(&p).await.unwrap();
                order(&runtime)
            } else {
                before.clone()
            };
            runtime.deactivate().await;
            (before, after)
        });
        prop_assert_eq!(before, after);
    }

    #[test]
    fn locked_palette_keeps_its_colors(actions in prop::collection::vec(action(), 1..12)) {
        let p: PaletteId = pid("p");
        let (before, after) = block_on(async {
            let runtime = runtime().await;
            runtime.set_locked(&p, true).await.unwrap();
            let before = runtime.snapshot().palette(&p).cloned().unwrap();
            for action in actions.iter().filter(|a| !matches!(a, Action::Lock(_))) {
                perform(&runtime, action).await;
            }
            let after = runtime.snapshot().palette(&p).cloned().unwrap();
            runtime.deactivate().await;
            (before, after)
        });
        prop_assert_eq!(before.colors, after.colors);
        prop_assert_eq!(before.color_order, after.color_order);
    }
}
