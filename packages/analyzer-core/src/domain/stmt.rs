//! Statement nodes (spec §6: `let`, `assign`, `augmented_assign`,
//! `return`, `expression`, `condition`, `while`, `until`, `repeat`,
//! `foreach`, `try`, `try_catch`).

use super::expr::{BinOp, ExprId};
use crate::common::{NodeId, Span};

pub type StmtId = NodeId;

#[derive(Debug, Clone)]
pub enum StmtKind {
    Let {
        name: String,
        value: ExprId,
    },
    Assign {
        target: String,
        value: ExprId,
    },
    AugmentedAssign {
        target: String,
        op: BinOp,
        value: ExprId,
    },
    Return {
        value: Option<ExprId>,
    },
    Expression {
        expr: ExprId,
    },
    Condition {
        cond: ExprId,
        then_branch: Vec<StmtId>,
        else_branch: Option<Vec<StmtId>>,
    },
    While {
        cond: ExprId,
        body: Vec<StmtId>,
    },
    Until {
        cond: ExprId,
        body: Vec<StmtId>,
    },
    Repeat {
        count: ExprId,
        body: Vec<StmtId>,
    },
    Foreach {
        key: String,
        value: String,
        collection: ExprId,
        body: Vec<StmtId>,
    },
    Try {
        body: Vec<StmtId>,
        catch: Option<Vec<StmtId>>,
    },
    TryCatch {
        body: Vec<StmtId>,
        catch_var: String,
        catch_body: Vec<StmtId>,
    },
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: StmtId,
    pub kind: StmtKind,
    pub span: Span,
}
