//! Minimal-move reconciliation for ordered collections.
//!
//! Commit must preserve revision-history fidelity on the wire: when the user
//! moved one row, exactly one move operation should reach the server, not a
//! clear-and-readd of the whole collection. The algorithm below reconciles
//! the working copy's sequence toward the dialog's sequence using the
//! smallest set of moves, with insert and surplus-removal steps enabled per
//! collection capability.

use serde::{Deserialize, Serialize};
use tracing::trace;

use concord_model::{ordered, Iid};

/// What an ordered collection supports beyond moving existing members.
/// Declared per collection in the class registry; never inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderedCaps {
    /// Entities present in the dialog sequence but absent from the working
    /// copy may be inserted by identity.
    pub insert: bool,
    /// Entities left at or beyond the target length after the forward pass
    /// are removed.
    pub remove_surplus: bool,
}

impl OrderedCaps {
    pub const MOVE_ONLY: Self = Self { insert: false, remove_surplus: false };

    pub const FULL: Self = Self { insert: true, remove_surplus: true };
}

/// A single emitted mutation, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OrderedMutation {
    Move { iid: Iid, from: usize, to: usize },
    Insert { iid: Iid, at: usize },
    Remove { iid: Iid, at: usize },
}

/// Reconcile `current` toward `target`, mutating `current` in place and
/// returning the mutations applied.
///
/// Sequence-equal inputs return an empty list without touching anything, so
/// running the reconciliation twice with no intervening edit emits nothing
/// the second time.
pub fn reconcile(
    current: &mut Vec<Iid>,
    target: &[Iid],
    caps: OrderedCaps,
) -> Vec<OrderedMutation> {
    if current.as_slice() == target {
        return Vec::new();
    }

    let mut mutations = Vec::new();

    // Forward pass: settle each target position in order.
    for (i, iid) in target.iter().enumerate() {
        match ordered::position_of(current, *iid) {
            Some(pos) if pos == i => {}
            Some(pos) => {
                ordered::move_item(current, pos, i);
                mutations.push(OrderedMutation::Move { iid: *iid, from: pos, to: i });
            }
            None if caps.insert => {
                ordered::insert_at(current, i, *iid);
                mutations.push(OrderedMutation::Insert { iid: *iid, at: i });
            }
            None => {}
        }
    }

    // Surplus pass: drop whatever the forward pass left beyond the target.
    if caps.remove_surplus {
        while current.len() > target.len() {
            let at = target.len();
            let iid = current[at];
            current.remove(at);
            mutations.push(OrderedMutation::Remove { iid, at });
        }
    }

    trace!(mutations = mutations.len(), "ordered reconciliation");
    mutations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: usize) -> Vec<Iid> {
        (0..n).map(|_| Iid::new()).collect()
    }

    #[test]
    fn sequence_equal_emits_nothing() {
        let v = ids(3);
        let mut current = v.clone();
        assert!(reconcile(&mut current, &v, OrderedCaps::MOVE_ONLY).is_empty());
        assert_eq!(current, v);
    }

    #[test]
    fn single_user_move_emits_single_mutation() {
        let v = ids(3);
        let mut current = v.clone();
        // user moved B down: [A, B, C] -> [A, C, B]
        let target = vec![v[0], v[2], v[1]];

        let mutations = reconcile(&mut current, &target, OrderedCaps::MOVE_ONLY);

        assert_eq!(current, target);
        assert_eq!(mutations, vec![OrderedMutation::Move { iid: v[2], from: 2, to: 1 }]);
    }

    #[test]
    fn reversal_converges() {
        let v = ids(5);
        let mut current = v.clone();
        let target: Vec<Iid> = v.iter().rev().copied().collect();
        reconcile(&mut current, &target, OrderedCaps::MOVE_ONLY);
        assert_eq!(current, target);
    }

    #[test]
    fn insert_requires_capability() {
        let v = ids(2);
        let extra = Iid::new();
        let target = vec![v[0], extra, v[1]];

        let mut without = v.clone();
        let mutations = reconcile(&mut without, &target, OrderedCaps::MOVE_ONLY);
        assert!(!without.contains(&extra));
        assert!(mutations.iter().all(|m| !matches!(m, OrderedMutation::Insert { .. })));

        let mut with = v.clone();
        let caps = OrderedCaps { insert: true, remove_surplus: false };
        let mutations = reconcile(&mut with, &target, caps);
        assert_eq!(with, target);
        assert_eq!(mutations, vec![OrderedMutation::Insert { iid: extra, at: 1 }]);
    }

    #[test]
    fn surplus_is_removed_only_when_supported() {
        let v = ids(4);
        let target = vec![v[1], v[0]];

        let mut kept = v.clone();
        reconcile(&mut kept, &target, OrderedCaps::MOVE_ONLY);
        assert_eq!(kept.len(), 4, "surplus must survive without the capability");
        assert_eq!(&kept[..2], &target[..]);

        let mut trimmed = v.clone();
        let mutations = reconcile(&mut trimmed, &target, OrderedCaps::FULL);
        assert_eq!(trimmed, target);
        let removed: Vec<Iid> = mutations
            .iter()
            .filter_map(|m| match m {
                OrderedMutation::Remove { iid, .. } => Some(*iid),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec![v[2], v[3]]);
    }

    #[test]
    fn second_run_is_idempotent_after_full_reconcile() {
        let v = ids(6);
        let mut current = v.clone();
        let target = vec![v[4], v[1], v[5], v[0]];

        reconcile(&mut current, &target, OrderedCaps::FULL);
        assert_eq!(current, target);
        assert!(reconcile(&mut current, &target, OrderedCaps::FULL).is_empty());
    }
}
