//! Newtype identifiers and the allocator that hands them out.
//!
//! Per the "replace the global id generator" design note, ids are produced
//! by an explicit [`IdAllocator`] value threaded through construction,
//! rather than a module-level mutable counter. Two compilation units built
//! from independent allocators never collide, so they can be built in
//! parallel (§5).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(NodeId);
id_newtype!(BlockId);
id_newtype!(EdgeId);
id_newtype!(CfgId);

/// Allocates monotonically increasing ids of a single kind.
///
/// Implementations may reset the counter (e.g. for deterministic tests);
/// production code constructs one fresh allocator per id kind per
/// compilation unit.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_node(&mut self) -> NodeId {
        NodeId(self.bump())
    }

    pub fn next_block(&mut self) -> BlockId {
        BlockId(self.bump())
    }

    pub fn next_edge(&mut self) -> EdgeId {
        EdgeId(self.bump())
    }

    pub fn next_cfg(&mut self) -> CfgId {
        CfgId(self.bump())
    }

    /// Number of ids allocated so far.
    pub fn len(&self) -> u32 {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotone_and_disjoint_across_allocators() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        let a_ids: Vec<_> = (0..3).map(|_| a.next_block()).collect();
        let b_ids: Vec<_> = (0..3).map(|_| b.next_block()).collect();
        assert_eq!(a_ids, vec![BlockId(0), BlockId(1), BlockId(2)]);
        assert_eq!(b_ids, vec![BlockId(0), BlockId(1), BlockId(2)]);
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(BlockId(7).to_string(), "7");
    }
}
