//! The dataflow solver (spec §4.E): a generic worklist fixpoint engine
//! parameterized by direction (forward/backward) and by the lattice kind
//! the detector's state uses (join or meet), with an optional widening
//! variant for loop termination on infinite-height domains.

mod combinator;

pub use combinator::{Combinator, JoinCombinator, MeetCombinator};

use crate::common::BlockId;
use crate::domain::AstStore;
use crate::ir::Cfg;
use crate::lattice::{Semilattice, WideningLattice};
use crate::transfer::TransferFunction;
use rustc_hash::FxHashMap;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Per-block input and output states at fixpoint (spec §8: "the sequence
/// of states stored at `b` across iterations is monotone non-decreasing
/// in `leq`" — these are the final states after that sequence converges).
#[derive(Debug, Clone)]
pub struct SolverResults<S> {
    pub states_in: FxHashMap<BlockId, S>,
    pub states_out: FxHashMap<BlockId, S>,
}

impl<S> SolverResults<S> {
    fn new() -> Self {
        Self {
            states_in: FxHashMap::default(),
            states_out: FxHashMap::default(),
        }
    }
}

/// Runs the worklist to a fixpoint with no widening. Terminates when the
/// state lattice has finite ascending/descending chains (spec §4.E).
pub fn solve<S, T, C>(
    cfg: &Cfg,
    ast: &AstStore,
    transfer: &T,
    direction: Direction,
    combinator: &C,
) -> SolverResults<S>
where
    S: Semilattice + Clone,
    T: TransferFunction<State = S>,
    C: Combinator<S>,
{
    run(cfg, ast, transfer, direction, combinator, |_block, _prev, candidate| candidate)
}

/// Runs the worklist with widening: once a block has been revisited more
/// than `threshold` times, the candidate output is replaced with
/// `widen(previous_output, candidate)` instead of the plain combinator
/// result, guaranteeing termination even on unbounded domains like
/// `Interval` (spec §4.A, §4.E step 4).
pub fn solve_with_widening<S, T, C>(
    cfg: &Cfg,
    ast: &AstStore,
    transfer: &T,
    direction: Direction,
    combinator: &C,
    threshold: usize,
) -> SolverResults<S>
where
    S: WideningLattice + Clone,
    T: TransferFunction<State = S>,
    C: Combinator<S>,
{
    let mut visits: FxHashMap<BlockId, usize> = FxHashMap::default();
    run(cfg, ast, transfer, direction, combinator, move |block, prev, candidate| {
        let count = visits.entry(block).or_insert(0);
        *count += 1;
        if *count > threshold {
            prev.widen(&candidate)
        } else {
            candidate
        }
    })
}

/// Shared worklist loop; `after_combine` is where the widening variant
/// hooks in (spec §4.E steps 3-4 are inseparable: the candidate computed
/// by `transfer` is immediately subject to the widening decision before
/// the `leq` comparison in step 5).
fn run<S, T, C>(
    cfg: &Cfg,
    ast: &AstStore,
    transfer: &T,
    direction: Direction,
    combinator: &C,
    mut after_combine: impl FnMut(BlockId, &S, S) -> S,
) -> SolverResults<S>
where
    S: Semilattice + Clone,
    T: TransferFunction<State = S>,
    C: Combinator<S>,
{
    let mut results = SolverResults::new();
    for block in cfg.blocks() {
        results.states_out.insert(block.id, combinator.initial());
    }

    let mut queue: VecDeque<BlockId> = cfg.blocks().iter().map(|b| b.id).collect();
    let mut queued: HashSet<BlockId> = queue.iter().copied().collect();

    while let Some(block_id) = queue.pop_front() {
        queued.remove(&block_id);
        let Some(block) = cfg.block(block_id) else {
            continue;
        };

        let neighbors = match direction {
            Direction::Forward => cfg.predecessors(block_id),
            Direction::Backward => cfg.successors(block_id),
        };
        let input_state = neighbors.iter().fold(combinator.initial(), |acc, &n| {
            match results.states_out.get(&n) {
                Some(state) => combinator.combine(&acc, state),
                None => acc,
            }
        });
        results.states_in.insert(block_id, input_state.clone());

        let candidate = transfer.transfer(&input_state, cfg, block, block.stmt, ast);
        let previous = results
            .states_out
            .get(&block_id)
            .cloned()
            .unwrap_or_else(|| combinator.initial());
        let candidate = after_combine(block_id, &previous, candidate);

        if !candidate.leq(&previous) {
            trace!(block = block_id.0, "state changed, requeuing successors");
            results.states_out.insert(block_id, candidate);
            let successors = match direction {
                Direction::Forward => cfg.successors(block_id),
                Direction::Backward => cfg.predecessors(block_id),
            };
            for next in successors {
                if queued.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    results
}
