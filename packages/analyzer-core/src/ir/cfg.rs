//! The control-flow graph of one function, method, or receiver (spec §3.4).

use super::block::Block;
use super::edge::Edge;
use crate::common::{BlockId, CfgId, EdgeId, Span};
use crate::errors::{AnalyzerError, Result};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgKind {
    Function,
    Method,
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgOrigin {
    User,
    Stdlib,
}

/// One function/method/receiver body lowered to basic blocks and edges.
/// Blocks and edges live in arena-style vectors addressed by id — never by
/// direct pointer — so the graph's back-edges (loops) never need to be
/// represented in the Rust ownership graph (Design Notes, "cyclic
/// graphs").
#[derive(Debug, Clone)]
pub struct Cfg {
    pub id: CfgId,
    pub name: String,
    pub kind: CfgKind,
    pub origin: CfgOrigin,
    pub span: Span,
    blocks: Vec<Block>,
    edges: Vec<Edge>,
    block_index: FxHashMap<BlockId, usize>,
    edge_index: FxHashMap<EdgeId, usize>,
}

impl Cfg {
    pub fn new(id: CfgId, name: impl Into<String>, kind: CfgKind, origin: CfgOrigin, span: Span) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            origin,
            span,
            blocks: Vec::new(),
            edges: Vec::new(),
            block_index: FxHashMap::default(),
            edge_index: FxHashMap::default(),
        }
    }

    pub fn add_block(&mut self, block: Block) {
        self.block_index.insert(block.id, self.blocks.len());
        self.blocks.push(block);
    }

    /// Adds an edge and updates both endpoints' `src_edges`/`dst_edges`
    /// sets, maintaining the §8 well-formedness invariant.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let src_pos = *self
            .block_index
            .get(&edge.src)
            .ok_or_else(|| AnalyzerError::internal(format!("edge src block {} not in CFG", edge.src)))?;
        let dst_pos = *self
            .block_index
            .get(&edge.dst)
            .ok_or_else(|| AnalyzerError::internal(format!("edge dst block {} not in CFG", edge.dst)))?;

        self.edge_index.insert(edge.id, self.edges.len());
        self.blocks[src_pos].dst_edges.insert(edge.id);
        self.blocks[dst_pos].src_edges.insert(edge.id);
        self.edges.push(edge);
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.block_index.get(&id).map(|&pos| &self.blocks[pos])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|&pos| &self.edges[pos])
    }

    /// The single logical entry: the first block in construction order
    /// (spec §3.4).
    pub fn entry(&self) -> Option<BlockId> {
        self.blocks.first().map(|b| b.id)
    }

    /// Any block whose kind is `Return` is an exit (spec §3.4).
    pub fn exits(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks
            .iter()
            .filter(|b| b.kind.is_return())
            .map(|b| b.id)
    }

    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        let Some(block) = self.block(id) else {
            return Vec::new();
        };
        block
            .src_edges
            .iter()
            .filter_map(|eid| self.edge(*eid))
            .map(|e| e.src)
            .collect()
    }

    pub fn successors(&self, id: BlockId) -> Vec<BlockId> {
        let Some(block) = self.block(id) else {
            return Vec::new();
        };
        block
            .dst_edges
            .iter()
            .filter_map(|eid| self.edge(*eid))
            .map(|e| e.dst)
            .collect()
    }

    /// Validates the §8 CFG well-formedness invariant: every edge's
    /// endpoints exist, and every block's `src_edges`/`dst_edges` agree
    /// with the edge list.
    pub fn check_well_formed(&self) -> Result<()> {
        for edge in &self.edges {
            if !self.block_index.contains_key(&edge.src) {
                return Err(AnalyzerError::internal(format!(
                    "edge {} references unknown src block {}",
                    edge.id, edge.src
                )));
            }
            if !self.block_index.contains_key(&edge.dst) {
                return Err(AnalyzerError::internal(format!(
                    "edge {} references unknown dst block {}",
                    edge.id, edge.dst
                )));
            }
        }
        for block in &self.blocks {
            for eid in &block.dst_edges {
                let edge = self
                    .edge(*eid)
                    .ok_or_else(|| AnalyzerError::internal(format!("dangling edge id {eid}")))?;
                if edge.src != block.id {
                    return Err(AnalyzerError::internal(format!(
                        "block {} dst_edges contains edge {} whose src is {}",
                        block.id, eid, edge.src
                    )));
                }
            }
            for eid in &block.src_edges {
                let edge = self
                    .edge(*eid)
                    .ok_or_else(|| AnalyzerError::internal(format!("dangling edge id {eid}")))?;
                if edge.dst != block.id {
                    return Err(AnalyzerError::internal(format!(
                        "block {} src_edges contains edge {} whose dst is {}",
                        block.id, eid, edge.dst
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{IdAllocator, Span};
    use crate::domain::StmtId;
    use crate::ir::block::BlockKind;
    use crate::ir::Block;

    fn mk_cfg() -> (Cfg, IdAllocator, IdAllocator) {
        let cfg = Cfg::new(CfgId(0), "f", CfgKind::Function, CfgOrigin::User, Span::zero());
        (cfg, IdAllocator::new(), IdAllocator::new())
    }

    #[test]
    fn well_formed_linear_cfg() {
        let (mut cfg, mut blocks, mut edges) = mk_cfg();
        let b0 = blocks.next_block();
        let b1 = blocks.next_block();
        cfg.add_block(Block::new(b0, StmtId(0), BlockKind::Regular, Span::zero()));
        cfg.add_block(Block::new(b1, StmtId(1), BlockKind::Return, Span::zero()));
        cfg.add_edge(Edge::new(edges.next_edge(), b0, b1)).unwrap();

        cfg.check_well_formed().unwrap();
        assert_eq!(cfg.entry(), Some(b0));
        assert_eq!(cfg.exits().collect::<Vec<_>>(), vec![b1]);
        assert_eq!(cfg.successors(b0), vec![b1]);
        assert_eq!(cfg.predecessors(b1), vec![b0]);
    }

    #[test]
    fn edge_to_unknown_block_is_internal_error() {
        let (mut cfg, mut blocks, mut edges) = mk_cfg();
        let b0 = blocks.next_block();
        cfg.add_block(Block::new(b0, StmtId(0), BlockKind::Regular, Span::zero()));
        let stray = BlockId(999);
        let err = cfg.add_edge(Edge::new(edges.next_edge(), b0, stray));
        assert!(err.is_err());
    }

    #[test]
    fn visiting_blocks_in_order_sees_each_once() {
        let (mut cfg, mut blocks, _edges) = mk_cfg();
        let ids: Vec<_> = (0..5).map(|_| blocks.next_block()).collect();
        for id in &ids {
            cfg.add_block(Block::new(*id, StmtId(0), BlockKind::Regular, Span::zero()));
        }
        let visited: Vec<_> = cfg.blocks().iter().map(|b| b.id).collect();
        assert_eq!(visited, ids);
    }
}
