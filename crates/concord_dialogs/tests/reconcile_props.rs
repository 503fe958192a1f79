//! Property tests for the ordered-collection reconciliation.

use proptest::prelude::*;
use uuid::Uuid;

use concord_dialogs::{reconcile, OrderedCaps, OrderedMutation};
use concord_model::Iid;

fn pool(n: usize) -> Vec<Iid> {
    (0..n).map(|i| Iid::from_uuid(Uuid::from_u128(i as u128 + 1))).collect()
}

fn dedup_pick(pool: &[Iid], indices: &[usize]) -> Vec<Iid> {
    let mut picked = Vec::new();
    for &i in indices {
        let iid = pool[i % pool.len()];
        if !picked.contains(&iid) {
            picked.push(iid);
        }
    }
    picked
}

proptest! {
    /// With both capabilities, reconciliation always converges to the target
    /// sequence, and a second run emits nothing.
    #[test]
    fn full_caps_converge_and_are_idempotent(
        current_idx in proptest::collection::vec(0usize..16, 0..12),
        target_idx in proptest::collection::vec(0usize..16, 0..12),
    ) {
        let pool = pool(16);
        let current = dedup_pick(&pool, &current_idx);
        let target = dedup_pick(&pool, &target_idx);

        let mut work = current.clone();
        reconcile(&mut work, &target, OrderedCaps::FULL);
        prop_assert_eq!(&work, &target);
        prop_assert!(reconcile(&mut work, &target, OrderedCaps::FULL).is_empty());
    }

    /// Move-only reconciliation of a permutation converges using moves
    /// alone, and never invents or drops members.
    #[test]
    fn move_only_converges_on_permutations(
        n in 1usize..10,
        swaps in proptest::collection::vec((0usize..10, 0usize..10), 0..24),
    ) {
        let current = pool(n);
        let mut target = current.clone();
        for (a, b) in swaps {
            target.swap(a % n, b % n);
        }

        let mut work = current.clone();
        let mutations = reconcile(&mut work, &target, OrderedCaps::MOVE_ONLY);
        prop_assert_eq!(&work, &target);
        prop_assert!(
            mutations.iter().all(|m| matches!(m, OrderedMutation::Move { .. })),
            "move-only reconciliation must emit only Move mutations"
        );
        prop_assert!(reconcile(&mut work, &target, OrderedCaps::MOVE_ONLY).is_empty());
    }

    /// Without capabilities, membership is invariant no matter the target.
    #[test]
    fn move_only_preserves_membership(
        current_idx in proptest::collection::vec(0usize..16, 0..12),
        target_idx in proptest::collection::vec(0usize..16, 0..12),
    ) {
        let pool = pool(16);
        let current = dedup_pick(&pool, &current_idx);
        let target = dedup_pick(&pool, &target_idx);

        let mut work = current.clone();
        reconcile(&mut work, &target, OrderedCaps::MOVE_ONLY);

        let mut before = current.clone();
        let mut after = work.clone();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
