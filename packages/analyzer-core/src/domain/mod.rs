//! The AST store and its node types (spec §3.3).

pub mod ast_store;
pub mod expr;
pub mod program_entry;
pub mod stmt;

pub use ast_store::{AstIds, AstStore, AstStoreBuilder};
pub use expr::{BinOp, Expr, ExprId, ExprKind, FieldInit, UnaryOp};
pub use program_entry::{EntryId, MethodDef, ProgramEntry, ReceiveDef, ReceiveKind};
pub use stmt::{Stmt, StmtId, StmtKind};
