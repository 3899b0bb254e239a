//! The CFG builder (spec §4.D): turns each function/method/receiver body
//! into a CFG where every statement maps to one basic block.

mod calls;

pub use calls::{collect_callees, FunctionNames, MethodNames};

use crate::common::{BlockId, CfgId, IdAllocator};
use crate::domain::{AstStore, ExprId, StmtId, StmtKind};
use crate::ir::{Block, BlockKind, Cfg, CfgKind, CfgOrigin, Edge};
use std::collections::HashSet;

/// Per-compilation-unit id sources, threaded through every CFG built for
/// that unit so block ids stay unique across the whole unit (spec §3.4)
/// without a global mutable counter (Design Notes).
pub struct BuilderIds {
    pub blocks: IdAllocator,
    pub edges: IdAllocator,
}

impl BuilderIds {
    pub fn new() -> Self {
        Self {
            blocks: IdAllocator::new(),
            edges: IdAllocator::new(),
        }
    }
}

impl Default for BuilderIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the CFG for one function/method/receiver body.
///
/// `functions`/`methods` must already contain every CFG in the enclosing
/// compilation unit (spec §4.D: "Preregister a CFG id for every
/// function/method/receive so call edges can target forward-declared
/// callees").
pub fn build_cfg(
    id: CfgId,
    name: &str,
    kind: CfgKind,
    origin: CfgOrigin,
    span: crate::common::Span,
    body: &[StmtId],
    ast: &AstStore,
    functions: &FunctionNames,
    methods: &MethodNames,
    ids: &mut BuilderIds,
) -> Cfg {
    let mut cfg = Cfg::new(id, name, kind, origin, span);
    let mut builder = Builder {
        ast,
        functions,
        methods,
        ids,
    };
    builder.process_stmts(&mut cfg, body, Vec::new());
    cfg
}

struct Builder<'a> {
    ast: &'a AstStore,
    functions: &'a FunctionNames,
    methods: &'a MethodNames,
    ids: &'a mut BuilderIds,
}

impl<'a> Builder<'a> {
    /// Processes a statement list, wiring fall-through/branch edges from
    /// `parents` into the first statement. Returns the open "tails" —
    /// block ids that the *syntactically next* statement (in the
    /// enclosing list, if any) should be connected from.
    fn process_stmts(&mut self, cfg: &mut Cfg, stmts: &[StmtId], parents: Vec<BlockId>) -> Vec<BlockId> {
        let mut parents = parents;
        for &stmt_id in stmts {
            parents = self.process_stmt(cfg, stmt_id, parents);
        }
        parents
    }

    fn process_stmt(&mut self, cfg: &mut Cfg, stmt_id: StmtId, parents: Vec<BlockId>) -> Vec<BlockId> {
        let Some(stmt) = self.ast.stmt(stmt_id) else {
            return parents;
        };

        match &stmt.kind {
            StmtKind::Return { .. } => {
                let block_id = self.new_block(cfg, stmt_id, BlockKind::Return, stmt.span.clone());
                self.connect_all(cfg, &parents, block_id);
                Vec::new()
            }
            StmtKind::Let { value, .. } => self.linear(cfg, stmt_id, *value, parents),
            StmtKind::Assign { value, .. } => self.linear(cfg, stmt_id, *value, parents),
            StmtKind::AugmentedAssign { value, .. } => self.linear(cfg, stmt_id, *value, parents),
            StmtKind::Expression { expr } => self.linear(cfg, stmt_id, *expr, parents),

            StmtKind::Condition {
                cond,
                then_branch,
                else_branch,
            } => {
                let kind = self.classify(*cond);
                let cond_block = self.new_block(cfg, stmt_id, kind, stmt.span.clone());
                self.connect_all(cfg, &parents, cond_block);

                let then_tails = self.process_stmts(cfg, then_branch, vec![cond_block]);
                let else_tails = match else_branch {
                    Some(else_stmts) => self.process_stmts(cfg, else_stmts, vec![cond_block]),
                    None => vec![cond_block],
                };

                let mut tails = then_tails;
                tails.extend(else_tails);
                tails
            }

            StmtKind::While { cond, body } | StmtKind::Until { cond, body } => {
                let kind = self.classify(*cond);
                let header = self.new_block(cfg, stmt_id, kind, stmt.span.clone());
                self.connect_all(cfg, &parents, header);

                let body_tails = self.process_stmts(cfg, body, vec![header]);
                // Explicit back-edge; never conflated with fall-through.
                self.connect_all(cfg, &body_tails, header);

                // The header is the loop-exit tail: the syntactically
                // next statement connects from here, not from the body.
                vec![header]
            }

            StmtKind::Repeat { count, body } => {
                let kind = self.classify(*count);
                let header = self.new_block(cfg, stmt_id, kind, stmt.span.clone());
                self.connect_all(cfg, &parents, header);

                let body_tails = self.process_stmts(cfg, body, vec![header]);
                self.connect_all(cfg, &body_tails, header);

                vec![header]
            }

            StmtKind::Foreach { collection, body, .. } => {
                let kind = self.classify(*collection);
                let header = self.new_block(cfg, stmt_id, kind, stmt.span.clone());
                self.connect_all(cfg, &parents, header);

                let body_tails = self.process_stmts(cfg, body, vec![header]);
                self.connect_all(cfg, &body_tails, header);

                vec![header]
            }

            StmtKind::Try { body, catch } => {
                let try_block = self.new_block(cfg, stmt_id, BlockKind::Regular, stmt.span.clone());
                self.connect_all(cfg, &parents, try_block);

                let body_tails = self.process_stmts(cfg, body, vec![try_block]);
                let mut tails = body_tails;
                if let Some(catch_stmts) = catch {
                    let catch_tails = self.process_stmts(cfg, catch_stmts, vec![try_block]);
                    tails.extend(catch_tails);
                }
                tails
            }

            StmtKind::TryCatch {
                body, catch_body, ..
            } => {
                let try_block = self.new_block(cfg, stmt_id, BlockKind::Regular, stmt.span.clone());
                self.connect_all(cfg, &parents, try_block);

                let body_tails = self.process_stmts(cfg, body, vec![try_block]);
                let catch_tails = self.process_stmts(cfg, catch_body, vec![try_block]);

                let mut tails = body_tails;
                tails.extend(catch_tails);
                tails
            }
        }
    }

    /// `let`/`assign`/`augmented_assign`/`expression`: one block, simple
    /// fall-through.
    fn linear(&mut self, cfg: &mut Cfg, stmt_id: StmtId, expr: ExprId, parents: Vec<BlockId>) -> Vec<BlockId> {
        let span = self.ast.stmt(stmt_id).map(|s| s.span.clone()).unwrap_or_default();
        let kind = self.classify(expr);
        let block_id = self.new_block(cfg, stmt_id, kind, span);
        self.connect_all(cfg, &parents, block_id);
        vec![block_id]
    }

    /// Block kind per spec §4.D: `Return` is handled by the caller before
    /// this is reached; here we only distinguish `Call` from `Regular`
    /// based on whether `expr` resolves to any CFG in the unit.
    fn classify(&self, expr: ExprId) -> BlockKind {
        let mut callees = HashSet::new();
        collect_callees(expr, self.ast, self.functions, self.methods, &mut callees);
        if callees.is_empty() {
            BlockKind::Regular
        } else {
            BlockKind::Call { callees }
        }
    }

    fn new_block(&mut self, cfg: &mut Cfg, stmt: StmtId, kind: BlockKind, span: crate::common::Span) -> BlockId {
        let id = self.ids.blocks.next_block();
        cfg.add_block(Block::new(id, stmt, kind, span));
        id
    }

    fn connect_all(&mut self, cfg: &mut Cfg, parents: &[BlockId], dst: BlockId) {
        for &src in parents {
            let edge_id = self.ids.edges.next_edge();
            cfg.add_edge(Edge::new(edge_id, src, dst))
                .expect("builder only ever connects blocks it has just registered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{IdAllocator as Ids, Span};
    use crate::domain::{Expr, ExprKind, Stmt};

    fn mk_number(ast: &mut crate::domain::AstStoreBuilder, ids: &mut Ids, n: i64) -> ExprId {
        let id = ids.next_node();
        ast.add_expr(Expr {
            id,
            kind: ExprKind::Number(n.into()),
            span: Span::zero(),
        });
        id
    }

    #[test]
    fn linear_chain_connects_every_statement_in_order() {
        let mut ids = Ids::new();
        let mut ast_builder = crate::domain::AstStore::builder();

        let e1 = mk_number(&mut ast_builder, &mut ids, 1);
        let e2 = mk_number(&mut ast_builder, &mut ids, 2);
        let s1 = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: s1,
            kind: StmtKind::Let {
                name: "a".into(),
                value: e1,
            },
            span: Span::zero(),
        });
        let s2 = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: s2,
            kind: StmtKind::Return { value: Some(e2) },
            span: Span::zero(),
        });
        let ast = ast_builder.build();

        let mut builder_ids = BuilderIds::new();
        let cfg = build_cfg(
            CfgId(0),
            "f",
            CfgKind::Function,
            CfgOrigin::User,
            Span::zero(),
            &[s1, s2],
            &ast,
            &FunctionNames::default(),
            &MethodNames::default(),
            &mut builder_ids,
        );

        assert_eq!(cfg.blocks().len(), 2);
        assert_eq!(cfg.edges().len(), 1);
        let entry = cfg.entry().unwrap();
        assert_eq!(cfg.successors(entry).len(), 1);
        let exits: Vec<_> = cfg.exits().collect();
        assert_eq!(exits.len(), 1);
        cfg.check_well_formed().unwrap();
    }

    #[test]
    fn if_else_branches_reconverge_at_next_statement() {
        let mut ids = Ids::new();
        let mut ast_builder = crate::domain::AstStore::builder();

        let cond = mk_number(&mut ast_builder, &mut ids, 1);
        let then_val = mk_number(&mut ast_builder, &mut ids, 2);
        let else_val = mk_number(&mut ast_builder, &mut ids, 3);
        let after_val = mk_number(&mut ast_builder, &mut ids, 4);

        let then_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: then_stmt,
            kind: StmtKind::Expression { expr: then_val },
            span: Span::zero(),
        });
        let else_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: else_stmt,
            kind: StmtKind::Expression { expr: else_val },
            span: Span::zero(),
        });
        let if_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: if_stmt,
            kind: StmtKind::Condition {
                cond,
                then_branch: vec![then_stmt],
                else_branch: Some(vec![else_stmt]),
            },
            span: Span::zero(),
        });
        let after_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: after_stmt,
            kind: StmtKind::Expression { expr: after_val },
            span: Span::zero(),
        });
        let ast = ast_builder.build();

        let mut builder_ids = BuilderIds::new();
        let cfg = build_cfg(
            CfgId(0),
            "f",
            CfgKind::Function,
            CfgOrigin::User,
            Span::zero(),
            &[if_stmt, after_stmt],
            &ast,
            &FunctionNames::default(),
            &MethodNames::default(),
            &mut builder_ids,
        );

        // if_block, then_block, else_block, after_block
        assert_eq!(cfg.blocks().len(), 4);
        cfg.check_well_formed().unwrap();

        let if_block = cfg.entry().unwrap();
        assert_eq!(cfg.successors(if_block).len(), 2);

        let after_block = cfg.blocks().last().unwrap().id;
        assert_eq!(cfg.predecessors(after_block).len(), 2);
    }

    #[test]
    fn while_loop_has_back_edge_and_separate_exit_edge() {
        let mut ids = Ids::new();
        let mut ast_builder = crate::domain::AstStore::builder();

        let cond = mk_number(&mut ast_builder, &mut ids, 1);
        let body_val = mk_number(&mut ast_builder, &mut ids, 2);
        let after_val = mk_number(&mut ast_builder, &mut ids, 3);

        let body_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: body_stmt,
            kind: StmtKind::Expression { expr: body_val },
            span: Span::zero(),
        });
        let while_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: while_stmt,
            kind: StmtKind::While {
                cond,
                body: vec![body_stmt],
            },
            span: Span::zero(),
        });
        let after_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: after_stmt,
            kind: StmtKind::Expression { expr: after_val },
            span: Span::zero(),
        });
        let ast = ast_builder.build();

        let mut builder_ids = BuilderIds::new();
        let cfg = build_cfg(
            CfgId(0),
            "f",
            CfgKind::Function,
            CfgOrigin::User,
            Span::zero(),
            &[while_stmt, after_stmt],
            &ast,
            &FunctionNames::default(),
            &MethodNames::default(),
            &mut builder_ids,
        );

        cfg.check_well_formed().unwrap();
        let header = cfg.entry().unwrap();
        // header -> body, header -> after
        assert_eq!(cfg.successors(header).len(), 2);
        let body_block = cfg.blocks()[1].id;
        // back-edge body -> header
        assert!(cfg.successors(body_block).contains(&header));
    }

    #[test]
    fn unreachable_code_after_return_still_gets_its_own_block() {
        let mut ids = Ids::new();
        let mut ast_builder = crate::domain::AstStore::builder();

        let ret_val = mk_number(&mut ast_builder, &mut ids, 1);
        let dead_val = mk_number(&mut ast_builder, &mut ids, 2);

        let ret_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: ret_stmt,
            kind: StmtKind::Return { value: Some(ret_val) },
            span: Span::zero(),
        });
        let dead_stmt = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: dead_stmt,
            kind: StmtKind::Expression { expr: dead_val },
            span: Span::zero(),
        });
        let ast = ast_builder.build();

        let mut builder_ids = BuilderIds::new();
        let cfg = build_cfg(
            CfgId(0),
            "f",
            CfgKind::Function,
            CfgOrigin::User,
            Span::zero(),
            &[ret_stmt, dead_stmt],
            &ast,
            &FunctionNames::default(),
            &MethodNames::default(),
            &mut builder_ids,
        );

        assert_eq!(cfg.blocks().len(), 2);
        assert_eq!(cfg.edges().len(), 0);
        cfg.check_well_formed().unwrap();
    }

    #[test]
    fn call_expression_marks_block_kind_call() {
        let mut ids = Ids::new();
        let mut ast_builder = crate::domain::AstStore::builder();

        let call_expr_id = ids.next_node();
        ast_builder.add_expr(Expr {
            id: call_expr_id,
            kind: ExprKind::StaticCall {
                name: "helper".into(),
                args: vec![],
            },
            span: Span::zero(),
        });
        let stmt_id = ids.next_node();
        ast_builder.add_stmt(Stmt {
            id: stmt_id,
            kind: StmtKind::Expression { expr: call_expr_id },
            span: Span::zero(),
        });
        let ast = ast_builder.build();

        let mut functions = FunctionNames::default();
        functions.insert("helper".into(), CfgId(42));
        let mut builder_ids = BuilderIds::new();
        let cfg = build_cfg(
            CfgId(0),
            "f",
            CfgKind::Function,
            CfgOrigin::User,
            Span::zero(),
            &[stmt_id],
            &ast,
            &functions,
            &MethodNames::default(),
            &mut builder_ids,
        );

        let block = &cfg.blocks()[0];
        assert_eq!(block.kind.callees().unwrap(), &HashSet::from([CfgId(42)]));
    }
}
