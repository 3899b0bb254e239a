//! Basic blocks (spec §3.4).

use crate::common::{BlockId, CfgId, EdgeId, Span};
use crate::domain::StmtId;
use std::collections::HashSet;

/// The kind of a basic block, computed by the CFG builder from the
/// statement it holds (spec §4.D). A sealed variant rather than a class
/// hierarchy, per the Design Notes' "dynamic dispatch -> tagged variants".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Regular,
    /// The statement's expression contains a call resolvable to another
    /// CFG in the enclosing compilation unit. Unresolved calls (dynamic
    /// dispatch, external functions) are omitted from `callees`, never
    /// causing the builder to fail (spec §4.D).
    Call { callees: HashSet<CfgId> },
    Return,
}

impl BlockKind {
    pub fn is_return(&self) -> bool {
        matches!(self, BlockKind::Return)
    }

    pub fn callees(&self) -> Option<&HashSet<CfgId>> {
        match self {
            BlockKind::Call { callees } => Some(callees),
            _ => None,
        }
    }
}

/// One basic block: a single statement plus the edges that connect it to
/// the rest of the CFG (spec §3.4 — "every statement maps to one basic
/// block").
///
/// Field naming follows spec §8's invariant literally:
/// `dst_edges = {e | e.src == self.id}` (outgoing edges, this block is
/// their source) and `src_edges = {e | e.dst == self.id}` (incoming
/// edges, this block is their destination).
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub stmt: StmtId,
    pub kind: BlockKind,
    pub span: Span,
    pub src_edges: HashSet<EdgeId>,
    pub dst_edges: HashSet<EdgeId>,
}

impl Block {
    pub fn new(id: BlockId, stmt: StmtId, kind: BlockKind, span: Span) -> Self {
        Self {
            id,
            stmt,
            kind,
            span,
            src_edges: HashSet::new(),
            dst_edges: HashSet::new(),
        }
    }
}
