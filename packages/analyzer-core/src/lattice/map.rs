//! Map instance: join merges by key-union, `leq` is key-and-value subset
//! (spec §4.B, §4.H). Conflicting keys are expected to carry structurally
//! equal values — callers that need to *combine* conflicting values (the
//! cell-bounds detector's per-variable storage) do that themselves before
//! handing the result to this lattice.

use super::{JoinSemilattice, Semilattice};
use ahash::AHashMap;
use std::hash::Hash;

/// Backed by `ahash` rather than the std hasher, matching the teacher's
/// own per-variable map types in its SSA/data-flow builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLattice<K: Eq + Hash + Clone, V: PartialEq + Clone>(pub AHashMap<K, V>);

impl<K: Eq + Hash + Clone, V: PartialEq + Clone> MapLattice<K, V> {
    pub fn new() -> Self {
        Self(AHashMap::new())
    }

    pub fn from_map(m: AHashMap<K, V>) -> Self {
        Self(m)
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.0.get(k)
    }

    pub fn insert(&mut self, k: K, v: V) {
        self.0.insert(k, v);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V: PartialEq + Clone> Default for MapLattice<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V: PartialEq + Clone> Semilattice for MapLattice<K, V> {
    /// Key-and-value subset: every key in `self` must be present in
    /// `other` with a structurally equal value.
    fn leq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .all(|(k, v)| other.0.get(k).is_some_and(|ov| ov == v))
    }
}

impl<K: Eq + Hash + Clone, V: PartialEq + Clone> JoinSemilattice for MapLattice<K, V> {
    fn bottom() -> Self {
        Self::new()
    }

    /// Key-union; a key present on both sides is expected to already carry
    /// equal values (debug-asserted), so either side's value is kept.
    fn join(&self, other: &Self) -> Self {
        let mut out = self.0.clone();
        for (k, v) in other.0.iter() {
            match out.get(k) {
                Some(existing) => debug_assert!(
                    existing == v,
                    "map lattice join saw conflicting values for the same key"
                ),
                None => {
                    out.insert(k.clone(), v.clone());
                }
            }
        }
        Self(out)
    }
}
