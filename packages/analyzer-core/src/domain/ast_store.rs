//! The AST store (spec §3.3): a process-scope indexed collection keyed by
//! a dense integer node id, built once after parsing and immutable
//! thereafter.

use super::expr::{Expr, ExprId};
use super::program_entry::{EntryId, ProgramEntry};
use super::stmt::{Stmt, StmtId};
use crate::common::IdAllocator;
use rustc_hash::FxHashMap;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct AstStore {
    entries: Vec<ProgramEntry>,
    entry_index: FxHashMap<EntryId, usize>,
    stmts: FxHashMap<StmtId, Stmt>,
    exprs: FxHashMap<ExprId, Expr>,
    /// Entry/statement ids that originate from the standard library rather
    /// than user code.
    stdlib_ids: HashSet<EntryId>,
}

impl AstStore {
    pub fn builder() -> AstStoreBuilder {
        AstStoreBuilder::default()
    }

    pub fn program_entries(&self) -> &[ProgramEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&ProgramEntry> {
        self.entry_index.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn stmt(&self, id: StmtId) -> Option<&Stmt> {
        self.stmts.get(&id)
    }

    pub fn expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(&id)
    }

    pub fn is_stdlib(&self, id: EntryId) -> bool {
        self.stdlib_ids.contains(&id)
    }

    pub fn iter_user_entries(&self) -> impl Iterator<Item = &ProgramEntry> {
        self.entries.iter().filter(|e| !self.is_stdlib(e.id()))
    }

    pub fn iter_stdlib_entries(&self) -> impl Iterator<Item = &ProgramEntry> {
        self.entries.iter().filter(|e| self.is_stdlib(e.id()))
    }
}

/// Builds an [`AstStore`] by walking parser output once; statements are
/// registered recursively as their containing entry is registered.
#[derive(Default)]
pub struct AstStoreBuilder {
    store: AstStore,
}

impl AstStoreBuilder {
    pub fn add_entry(&mut self, entry: ProgramEntry, is_stdlib: bool) -> &mut Self {
        let id = entry.id();
        if is_stdlib {
            self.store.stdlib_ids.insert(id);
        }
        self.store.entry_index.insert(id, self.store.entries.len());
        self.store.entries.push(entry);
        self
    }

    pub fn add_stmt(&mut self, stmt: Stmt) -> &mut Self {
        self.store.stmts.insert(stmt.id, stmt);
        self
    }

    pub fn add_expr(&mut self, expr: Expr) -> &mut Self {
        self.store.exprs.insert(expr.id, expr);
        self
    }

    pub fn build(self) -> AstStore {
        self.store
    }
}

/// Convenience id source for tests and adapters building a store by hand;
/// production adapters typically have their own parser-assigned ids.
#[derive(Default)]
pub struct AstIds {
    pub allocator: IdAllocator,
}

impl AstIds {
    pub fn new() -> Self {
        Self {
            allocator: IdAllocator::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::domain::expr::{Expr, ExprKind};
    use crate::domain::program_entry::ProgramEntry;
    use crate::domain::stmt::{Stmt, StmtKind};

    #[test]
    fn stdlib_and_user_entries_are_filtered_separately() {
        let mut ids = AstIds::new();
        let mut b = AstStore::builder();
        let user_fn = ids.allocator.next_node();
        let std_fn = ids.allocator.next_node();
        b.add_entry(
            ProgramEntry::Function {
                id: user_fn,
                name: "main".into(),
                body: vec![],
                span: Span::zero(),
            },
            false,
        );
        b.add_entry(
            ProgramEntry::Function {
                id: std_fn,
                name: "beginCell".into(),
                body: vec![],
                span: Span::zero(),
            },
            true,
        );
        let store = b.build();

        assert_eq!(store.iter_user_entries().count(), 1);
        assert_eq!(store.iter_stdlib_entries().count(), 1);
        assert!(!store.is_stdlib(user_fn));
        assert!(store.is_stdlib(std_fn));
    }

    #[test]
    fn lookup_by_id_round_trips() {
        let mut ids = AstIds::new();
        let mut b = AstStore::builder();
        let expr_id = ids.allocator.next_node();
        b.add_expr(Expr {
            id: expr_id,
            kind: ExprKind::Boolean(true),
            span: Span::zero(),
        });
        let stmt_id = ids.allocator.next_node();
        b.add_stmt(Stmt {
            id: stmt_id,
            kind: StmtKind::Expression { expr: expr_id },
            span: Span::zero(),
        });
        let store = b.build();

        assert!(matches!(store.expr(expr_id).unwrap().kind, ExprKind::Boolean(true)));
        assert!(store.stmt(stmt_id).is_some());
        assert!(store.stmt(ids.allocator.next_node()).is_none());
    }
}
