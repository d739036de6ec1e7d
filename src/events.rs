use std::collections::HashSet;

use crate::types::ColliderId;

/// Unordered pair identity: the two collider ids in canonical ascending
/// order, so `(A, B)` and `(B, A)` hash identically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PairKey(ColliderId, ColliderId);

impl PairKey {
    pub fn new(a: ColliderId, b: ColliderId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// Transition of an overlapping pair between consecutive steps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PairPhase {
    /// Present this step, absent last step.
    Entered,
    /// Present both steps.
    Staying,
    /// Absent this step, present last step. Terminal: the key drops out of
    /// tracking once reported, so a later re-overlap starts a fresh Enter.
    Exited,
}

/// Cross-step identity set of overlapping pairs.
///
/// Set membership, not manifold content, drives Enter/Stay/Exit
/// classification; the trigger flag only selects the listener category.
#[derive(Default, Debug)]
pub struct PairTracker {
    current: HashSet<PairKey>,
    previous: HashSet<PairKey>,
}

impl PairTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership in the most recently rolled set. Between detection and the
    /// next [`roll`](Self::roll) this answers "did this pair overlap last
    /// step".
    pub fn contains(&self, key: PairKey) -> bool {
        self.current.contains(&key)
    }

    /// Roll the sets for a new step: last step's current set becomes the
    /// previous set and the given keys become current.
    pub fn roll(&mut self, keys: impl IntoIterator<Item = PairKey>) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
        self.current.extend(keys);
    }

    /// Classify a currently-overlapping pair against the previous step.
    pub fn phase(&self, key: PairKey) -> PairPhase {
        if self.previous.contains(&key) {
            PairPhase::Staying
        } else {
            PairPhase::Entered
        }
    }

    /// Pairs that stopped overlapping this step. Reported once; the next
    /// roll discards them.
    pub fn exited(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.previous.difference(&self.current).copied()
    }
}
