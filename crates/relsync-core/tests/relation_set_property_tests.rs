// Property tests for RelationSet ordering, no-op detection and minimal diffs.

mod common;

use std::collections::BTreeSet;

use common::{new_groups, GROUP_TABLE, JOIN_TABLE, PARENT_ID};
use proptest::prelude::*;
use relsync_core::backend::BackendOp;
use relsync_core::{MemoryBackend, ResolutionPolicy};

const POOL: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

fn seeded_backend(linked: &BTreeSet<&str>) -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    for name in POOL {
        let id = backend.seed_entity(GROUP_TABLE, name);
        if linked.contains(name) {
            backend.seed_link(JOIN_TABLE, PARENT_ID, id);
        }
    }
    backend
}

fn names_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(POOL), 0..12)
}

fn subset_strategy() -> impl Strategy<Value = BTreeSet<&'static str>> {
    prop::sample::subsequence(POOL.to_vec(), 0..=POOL.len())
        .prop_map(|names| names.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_load_then_store_writes_nothing(linked in subset_strategy()) {
        let mut backend = seeded_backend(&linked);
        let mut set = new_groups();
        set.load(&backend).unwrap();

        set.store(&mut backend).unwrap();

        prop_assert_eq!(backend.write_count(), 0);
        prop_assert_eq!(set.len(), linked.len());
    }

    #[test]
    fn prop_set_iterates_sorted_and_deduplicated(names in names_strategy()) {
        let mut backend = seeded_backend(&BTreeSet::new());
        let mut set = new_groups();

        set.set(names.clone(), ResolutionPolicy::Fail, &mut backend).unwrap();

        let expected: Vec<String> = names
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();
        let iterated: Vec<String> = set.iter().map(|e| e.name.clone()).collect();
        prop_assert_eq!(iterated, expected);
    }

    #[test]
    fn prop_set_current_names_is_noop(
        linked in subset_strategy(),
        seed in any::<u64>(),
    ) {
        let mut backend = seeded_backend(&linked);
        let mut set = new_groups();
        set.load(&backend).unwrap();
        backend.clear_calls();

        let mut shuffled: Vec<&str> = linked.iter().copied().collect();
        let len = shuffled.len();
        if len > 1 {
            shuffled.rotate_left((seed as usize) % len);
        }
        set.set(shuffled, ResolutionPolicy::Fail, &mut backend).unwrap();

        prop_assert!(!set.has_been_modified());
        prop_assert_eq!(backend.count(BackendOp::QueryByNames), 0);
    }

    #[test]
    fn prop_store_applies_exact_symmetric_difference(
        before in subset_strategy(),
        after in subset_strategy(),
    ) {
        let mut backend = seeded_backend(&before);
        let mut set = new_groups();
        set.load(&backend).unwrap();
        set.set(after.iter().copied(), ResolutionPolicy::Fail, &mut backend).unwrap();
        backend.clear_calls();

        set.store(&mut backend).unwrap();

        prop_assert_eq!(backend.count(BackendOp::DeleteJoinRow), before.difference(&after).count());
        prop_assert_eq!(backend.count(BackendOp::InsertJoinRow), after.difference(&before).count());

        let reloaded = {
            let mut fresh = new_groups();
            fresh.load(&backend).unwrap();
            fresh.list_related_names()
        };
        let expected: Vec<String> = after.iter().map(|s| s.to_string()).collect();
        prop_assert_eq!(reloaded, expected.clone());
        prop_assert_eq!(set.list_original_names(), expected);
    }
}
