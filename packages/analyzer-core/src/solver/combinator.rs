//! Join/meet combination strategy (spec §4.E step 2): which operator the
//! solver folds over a block's predecessor/successor states, and which
//! element seeds that fold.

use crate::lattice::{JoinSemilattice, MeetSemilattice};

pub trait Combinator<S> {
    fn initial(&self) -> S;
    fn combine(&self, a: &S, b: &S) -> S;
}

/// Forward/backward join analysis: folds `join` starting from `bottom()`.
pub struct JoinCombinator;

impl<S: JoinSemilattice> Combinator<S> for JoinCombinator {
    fn initial(&self) -> S {
        S::bottom()
    }

    fn combine(&self, a: &S, b: &S) -> S {
        a.join(b)
    }
}

/// Forward/backward meet analysis: folds `meet` starting from `top()`.
pub struct MeetCombinator;

impl<S: MeetSemilattice> Combinator<S> for MeetCombinator {
    fn initial(&self) -> S {
        S::top()
    }

    fn combine(&self, a: &S, b: &S) -> S {
        a.meet(b)
    }
}
