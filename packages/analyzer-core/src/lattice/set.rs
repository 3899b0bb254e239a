//! Set instance: join = union, meet = intersection (spec §4.B).

use super::{JoinSemilattice, Semilattice};
use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLattice<T: Eq + Hash + Clone>(pub HashSet<T>);

impl<T: Eq + Hash + Clone> SetLattice<T> {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn singleton(v: T) -> Self {
        let mut s = HashSet::new();
        s.insert(v);
        Self(s)
    }

    pub fn from_iter(it: impl IntoIterator<Item = T>) -> Self {
        Self(it.into_iter().collect())
    }

    pub fn contains(&self, v: &T) -> bool {
        self.0.contains(v)
    }

    pub fn insert(&mut self, v: T) {
        self.0.insert(v);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for SetLattice<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Semilattice for SetLattice<T> {
    fn leq(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl<T: Eq + Hash + Clone> JoinSemilattice for SetLattice<T> {
    fn bottom() -> Self {
        Self::new()
    }

    fn join(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

/// A meet analysis over an explicit, caller-supplied universe of tracked
/// values. `top()` is parameterized by that universe (spec §4.B "Map
/// instances ... require caller-supplied equality"; the analogous
/// requirement here is a caller-supplied universe), so this does not
/// implement [`super::MeetSemilattice`] directly — construct `top_with`
/// once per analysis and carry it alongside the lattice values instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedSetLattice<T: Eq + Hash + Clone> {
    pub universe: std::rc::Rc<HashSet<T>>,
    pub members: HashSet<T>,
}

impl<T: Eq + Hash + Clone> BoundedSetLattice<T> {
    pub fn new(universe: std::rc::Rc<HashSet<T>>, members: HashSet<T>) -> Self {
        Self { universe, members }
    }

    pub fn top_with(universe: std::rc::Rc<HashSet<T>>) -> Self {
        let members = universe.as_ref().clone();
        Self { universe, members }
    }

    pub fn leq(&self, other: &Self) -> bool {
        self.members.is_superset(&other.members)
    }

    pub fn meet(&self, other: &Self) -> Self {
        Self::new(
            self.universe.clone(),
            self.members
                .intersection(&other.members)
                .cloned()
                .collect(),
        )
    }
}
