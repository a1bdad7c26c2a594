// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{cid, color, ids, palette, pid, warm_records, warm_state};
use sw_core::Attribute;

fn retired(keys: &[RecordKey]) -> HashSet<RecordKey> {
    keys.iter().cloned().collect()
}

#[test]
fn identical_sides_need_nothing() {
    let plan = reconcile(&warm_state(), &warm_records(), &HashSet::new());
    assert!(plan.is_empty());
}

#[test]
fn remote_only_records_are_pulled_colors_first() {
    let local = MaterializedState::new();
    let plan = reconcile(&local, &warm_records(), &HashSet::new());

    assert!(plan.push.is_empty());
    let keys: Vec<_> = plan.pull.iter().map(Operation::key).collect();
    let first_palette = keys.iter().position(|k| k.as_palette().is_some()).unwrap();
    assert!(keys[..first_palette].iter().all(|k| k.as_color().is_some()));
    assert_eq!(plan.pull.len(), 5);
}

#[test]
fn local_only_records_are_pushed() {
    let mut local = warm_state();
    local.insert(color("x", 9).into());
    let plan = reconcile(&local, &warm_records(), &HashSet::new());
    assert_eq!(plan.push, vec![Operation::add_record(color("x", 9))]);
    assert!(plan.pull.is_empty());
}

#[test]
fn attribute_conflicts_favor_remote() {
    let mut remote = warm_state();
    remote.colors.get_mut("a").unwrap().name = "Remote".into();
    remote.palettes.get_mut("p").unwrap().is_favorite = true;

    let plan = reconcile(&warm_state(), &remote.records(), &HashSet::new());

    assert_eq!(
        plan.pull,
        vec![
            Operation::update_attribute(RecordKey::color(&cid("a")), Attribute::Name("Remote".into())),
            Operation::update_attribute(RecordKey::palette(&pid("p")), Attribute::IsFavorite(true)),
        ]
    );
    assert!(plan.push.is_empty());
}

#[test]
fn relational_differences_favor_local() {
    let mut remote = warm_state();
    {
        let p = remote.palettes.get_mut("p").unwrap();
        p.colors.remove("b");
        p.color_order = ids(&["c", "a"]);
    }

    let plan = reconcile(&warm_state(), &remote.records(), &HashSet::new());

    assert!(plan.pull.is_empty());
    assert_eq!(
        plan.push,
        vec![
            Operation::replace_relationship(&pid("p"), ids(&["a", "b", "c"]).into_iter().collect()),
            Operation::set_color_order(&pid("p"), ids(&["a", "b", "c"])),
        ]
    );
}

#[test]
fn locally_removed_records_are_removed_remotely() {
    let mut local = warm_state();
    local.palettes.remove("p");
    let plan = reconcile(
        &local,
        &warm_records(),
        &retired(&[RecordKey::palette(&pid("p"))]),
    );
    assert!(plan.pull.is_empty());
    assert_eq!(plan.push, vec![Operation::remove_record(RecordKey::palette(&pid("p")))]);
}

#[test]
fn pulled_palettes_drop_retired_colors() {
    let mut local = warm_state();
    local.palettes.remove("p");
    local.palettes.get_mut("history").unwrap().colors.remove("b");
    local.palettes.get_mut("history").unwrap().color_order = ids(&["c", "a"]);
    local.colors.remove("b");
    let mut remote = warm_state();
    remote.insert(palette("q", &["a", "b"]).into());
    remote.palettes.remove("p");

    let plan = reconcile(
        &local,
        &remote.records(),
        &retired(&[RecordKey::color(&cid("b"))]),
    );

    let pulled = plan
        .pull
        .iter()
        .find_map(|op| match op {
            Operation::AddRecord { record } => record.as_palette().cloned(),
            _ => None,
        })
        .unwrap();
    assert_eq!(pulled.color_order, ids(&["a"]));
    assert!(pulled.order_matches());
    // Remote copies lose the reference before the color goes
    assert_eq!(
        plan.push.last(),
        Some(&Operation::remove_record(RecordKey::color(&cid("b"))))
    );
    assert!(plan.push.contains(&Operation::set_color_order(&pid("q"), ids(&["a"]))));
}

#[test]
fn background_pull_keeps_unsent_local_changes() {
    let mut remote = warm_state();
    remote.colors.get_mut("a").unwrap().name = "Remote".into();
    remote.palettes.get_mut("p").unwrap().name = "Stale".into();
    let unsent = retired(&[RecordKey::palette(&pid("p"))]);

    let pull = background_pull(&warm_state(), &remote.records(), &HashSet::new(), &unsent);

    assert_eq!(
        pull,
        vec![Operation::update_attribute(
            RecordKey::color(&cid("a")),
            Attribute::Name("Remote".into())
        )]
    );
}
