//! Expression nodes (spec §6: "identifier, number literal, boolean,
//! string, null, binary op, unary op, field access, method call, static
//! call, struct instance, conditional, init-of").

use crate::common::{NodeId, Span};
use num_bigint::BigInt;

pub type ExprId = NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

/// A single field in a struct/message literal: `{ name: value }`.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: ExprId,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Identifier(String),
    Number(BigInt),
    Boolean(bool),
    Str(String),
    Null,
    Binary {
        op: BinOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    FieldAccess {
        base: ExprId,
        field: String,
    },
    /// `receiver.method(args)`. `receiver` is `None` for a bare free
    /// function call spelled as a method (not used by the builder, kept
    /// for adapters that normalize calls this way).
    MethodCall {
        receiver: ExprId,
        method: String,
        args: Vec<ExprId>,
    },
    /// `name(args)` — a free function or static call.
    StaticCall {
        name: String,
        args: Vec<ExprId>,
    },
    StructInstance {
        type_name: String,
        fields: Vec<FieldInit>,
    },
    Conditional {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    InitOf {
        contract: String,
        args: Vec<ExprId>,
    },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    /// Walk the method-call chain rooted at a `self.m1(...).m2(...)...`
    /// expression: returns `(receiver_of_first_call, [method_name, args]...)`
    /// in left-to-right call order, or `None` if `self` isn't a chain of
    /// method calls at all (e.g. a bare identifier or a binary op).
    pub fn as_method_chain<'a>(
        &'a self,
        store: &'a super::AstStore,
    ) -> Option<(ExprId, Vec<&'a Expr>)> {
        let mut calls = Vec::new();
        let mut current = self;
        loop {
            match &current.kind {
                ExprKind::MethodCall { receiver, .. } => {
                    calls.push(current);
                    current = store.expr(*receiver)?;
                }
                _ => break,
            }
        }
        calls.reverse();
        if calls.is_empty() {
            None
        } else {
            Some((current.id, calls))
        }
    }
}
