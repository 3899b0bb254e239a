//! The transfer-function contract (spec §4.F): the interface a dataflow
//! detector implements to define per-statement effects, handed to the
//! worklist solver.

use crate::domain::{AstStore, StmtId};
use crate::ir::{Block, Cfg};

/// `transfer(in_state, block, statement) -> out_state` (spec §4.F).
///
/// Implementations must be:
/// - **pure** with respect to external state (no I/O, no shared mutable
///   state between calls);
/// - **monotone** with respect to the state's `leq` — the detector's
///   responsibility, not the solver's;
/// - deep-owning: the returned state must not alias the input state, so
///   the solver can retain both independently to test `leq` (§5, §9
///   "deep-copy dataflow states").
pub trait TransferFunction {
    type State: Clone;

    fn transfer(
        &self,
        in_state: &Self::State,
        cfg: &Cfg,
        block: &Block,
        stmt: StmtId,
        ast: &AstStore,
    ) -> Self::State;
}
