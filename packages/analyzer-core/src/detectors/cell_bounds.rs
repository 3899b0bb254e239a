//! The cell-bounds detector (spec §4.H): the representative dataflow
//! detector exercising every framework contract (numeric domain, lattice
//! algebra, worklist solver, transfer contract) to bound the bits and
//! references stored into or loaded out of `Builder`/`Cell`/`Slice`/
//! struct-or-message local variables.

use super::Detector;
use crate::common::Span;
use crate::domain::{AstStore, Expr, ExprId, ExprKind, Stmt, StmtKind};
use crate::ir::{Block, Cfg};
use crate::lattice::{JoinSemilattice, MapLattice, Semilattice};
use crate::numeric::{Interval, Num};
use crate::solver::{solve, Direction, JoinCombinator};
use crate::transfer::TransferFunction;
use crate::warning::{Category, Severity, Warning};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::collections::HashSet;

/// Virtual-machine cell limits (spec §4.H, §8): immutable, not policy.
pub const MAX_REFS: i64 = 4;
pub const MAX_DATA_BITS: i64 = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Builder,
    Cell,
    Slice,
    /// Structs and messages are combined into a single kind (spec §4.H).
    StructMessage,
}

/// One dimension (references, or data bits) of a tracked variable's
/// storage summary (spec §4.H).
#[derive(Debug, Clone, PartialEq)]
pub struct StorageValue {
    pub undecidable: bool,
    pub stored: Interval,
    pub loaded: Interval,
}

impl StorageValue {
    pub fn zero() -> Self {
        Self {
            undecidable: false,
            stored: Interval::exact(0, 0),
            loaded: Interval::exact(0, 0),
        }
    }

    pub fn undecidable() -> Self {
        Self {
            undecidable: true,
            stored: Interval::full(),
            loaded: Interval::full(),
        }
    }

    fn add_stored(&self, delta: Interval) -> Self {
        Self {
            undecidable: self.undecidable,
            stored: self.stored.add(&delta),
            loaded: self.loaded.clone(),
        }
    }

    fn add_loaded(&self, delta: Interval) -> Self {
        Self {
            undecidable: self.undecidable,
            stored: self.stored.clone(),
            loaded: self.loaded.add(&delta),
        }
    }

    fn mark_undecidable(&self) -> Self {
        Self {
            undecidable: true,
            ..self.clone()
        }
    }

    fn join(&self, other: &Self) -> Self {
        Self {
            undecidable: self.undecidable || other.undecidable,
            stored: self.stored.join(&other.stored),
            loaded: self.loaded.join(&other.loaded),
        }
    }
}

/// `VariableStorage` (spec §4.H): what the detector tracks per variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStorage {
    pub refs_num: StorageValue,
    pub data_size: StorageValue,
}

impl VariableStorage {
    pub fn zero() -> Self {
        Self {
            refs_num: StorageValue::zero(),
            data_size: StorageValue::zero(),
        }
    }

    /// A struct/message literal: `dataSize` is marked undecidable
    /// immediately (spec §4.H — field layout isn't modeled), `refsNum`
    /// starts at zero since messages don't natively hold cell references.
    fn struct_literal() -> Self {
        Self {
            refs_num: StorageValue::zero(),
            data_size: StorageValue::undecidable(),
        }
    }

    fn add_refs_stored(&self, delta: Interval) -> Self {
        Self {
            refs_num: self.refs_num.add_stored(delta),
            data_size: self.data_size.clone(),
        }
    }

    fn add_refs_loaded(&self, delta: Interval) -> Self {
        Self {
            refs_num: self.refs_num.add_loaded(delta),
            data_size: self.data_size.clone(),
        }
    }

    fn add_data_stored(&self, delta: Interval) -> Self {
        Self {
            refs_num: self.refs_num.clone(),
            data_size: self.data_size.add_stored(delta),
        }
    }

    fn add_data_loaded(&self, delta: Interval) -> Self {
        Self {
            refs_num: self.refs_num.clone(),
            data_size: self.data_size.add_loaded(delta),
        }
    }

    fn mark_undecidable(&self) -> Self {
        Self {
            refs_num: self.refs_num.mark_undecidable(),
            data_size: self.data_size.mark_undecidable(),
        }
    }

    fn join(&self, other: &Self) -> Self {
        Self {
            refs_num: self.refs_num.join(&other.refs_num),
            data_size: self.data_size.join(&other.data_size),
        }
    }
}

/// The dataflow state (spec §4.H): per-kind maps of tracked local
/// variables plus the statement-local list of intermediate (rvalue-only)
/// variables produced by expression chains.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBoundsState {
    builders: MapLattice<String, VariableStorage>,
    cells: MapLattice<String, VariableStorage>,
    slices: MapLattice<String, VariableStorage>,
    struct_messages: MapLattice<String, VariableStorage>,
    intermediates: Vec<(VarKind, VariableStorage)>,
}

impl Default for CellBoundsState {
    fn default() -> Self {
        Self {
            builders: MapLattice::new(),
            cells: MapLattice::new(),
            slices: MapLattice::new(),
            struct_messages: MapLattice::new(),
            intermediates: Vec::new(),
        }
    }
}

impl CellBoundsState {
    fn map(&self, kind: VarKind) -> &MapLattice<String, VariableStorage> {
        match kind {
            VarKind::Builder => &self.builders,
            VarKind::Cell => &self.cells,
            VarKind::Slice => &self.slices,
            VarKind::StructMessage => &self.struct_messages,
        }
    }

    fn lookup(&self, name: &str) -> Option<(VarKind, &VariableStorage)> {
        for kind in [VarKind::Builder, VarKind::Cell, VarKind::Slice, VarKind::StructMessage] {
            if let Some(v) = self.map(kind).get(&name.to_string()) {
                return Some((kind, v));
            }
        }
        None
    }

    fn is_tracked(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn bind(&mut self, name: &str, kind: VarKind, storage: VariableStorage) {
        self.builders.0.remove(name);
        self.cells.0.remove(name);
        self.slices.0.remove(name);
        self.struct_messages.0.remove(name);
        match kind {
            VarKind::Builder => self.builders.insert(name.to_string(), storage),
            VarKind::Cell => self.cells.insert(name.to_string(), storage),
            VarKind::Slice => self.slices.insert(name.to_string(), storage),
            VarKind::StructMessage => self.struct_messages.insert(name.to_string(), storage),
        }
    }

    /// Every tracked or intermediate variable (spec §4.H "After the
    /// solver terminates, for every block and every tracked or
    /// intermediate variable...").
    fn all_variables(&self) -> impl Iterator<Item = &VariableStorage> {
        self.builders
            .iter()
            .chain(self.cells.iter())
            .chain(self.slices.iter())
            .chain(self.struct_messages.iter())
            .map(|(_, v)| v)
            .chain(self.intermediates.iter().map(|(_, v)| v))
    }
}

impl Semilattice for CellBoundsState {
    /// Key-and-value subset on each per-kind map (spec §4.H "`leq` uses
    /// key-and-value subset"). Intermediates are statement-local
    /// scratch, recomputed fresh from the input maps every time
    /// `transfer` runs (never persisted across iterations), so they
    /// play no part in fixpoint comparison.
    fn leq(&self, other: &Self) -> bool {
        self.builders.leq(&other.builders)
            && self.cells.leq(&other.cells)
            && self.slices.leq(&other.slices)
            && self.struct_messages.leq(&other.struct_messages)
    }
}

impl JoinSemilattice for CellBoundsState {
    fn bottom() -> Self {
        Self::default()
    }

    /// Join merges the per-kind maps by key-union and concatenates
    /// intermediates (spec §4.H).
    fn join(&self, other: &Self) -> Self {
        let mut intermediates = self.intermediates.clone();
        intermediates.extend(other.intermediates.iter().cloned());
        Self {
            builders: self.builders.join(&other.builders),
            cells: self.cells.join(&other.cells),
            slices: self.slices.join(&other.slices),
            struct_messages: self.struct_messages.join(&other.struct_messages),
            intermediates,
        }
    }
}

/// spec §4.H "kind transition" table.
fn transition(kind: VarKind, method: &str) -> Option<VarKind> {
    match (kind, method) {
        (VarKind::Builder, "endCell") | (VarKind::Builder, "asCell") => Some(VarKind::Cell),
        (VarKind::Builder, "asSlice") => Some(VarKind::Slice),
        (VarKind::Cell, "asSlice") | (VarKind::Cell, "beginParse") => Some(VarKind::Slice),
        (VarKind::StructMessage, "toCell") => Some(VarKind::Cell),
        (VarKind::StructMessage, "toSlice") => Some(VarKind::Slice),
        (VarKind::Cell, "fromCell") => Some(VarKind::StructMessage),
        (VarKind::Slice, "fromSlice") => Some(VarKind::StructMessage),
        _ => None,
    }
}

fn constant_arg(args: &[ExprId], idx: usize, ast: &AstStore) -> Option<BigInt> {
    let expr = ast.expr(*args.get(idx)?)?;
    match &expr.kind {
        ExprKind::Number(n) => Some(n.clone()),
        _ => None,
    }
}

fn bigint_to_i64(n: &BigInt) -> i64 {
    n.to_i64().unwrap_or(i64::MAX)
}

/// `constant_store_size`/`constant_load_size` (spec §6): the bit width of
/// a call when statically derivable. In the full system these are
/// supplied by the AST adapter; the core only needs *a* source of truth
/// for the common fixed-width and value-plus-width builtins.
fn constant_store_size(method: &str, args: &[ExprId], ast: &AstStore) -> Option<i64> {
    match method {
        "storeInt" | "storeUint" => constant_arg(args, 1, ast).map(|n| bigint_to_i64(&n)),
        "storeBool" | "storeBit" => Some(1),
        _ => None,
    }
}

fn constant_load_size(method: &str, args: &[ExprId], ast: &AstStore) -> Option<i64> {
    match method {
        "loadInt" | "loadUint" => constant_arg(args, 0, ast).map(|n| bigint_to_i64(&n)),
        "loadBool" | "loadBit" => Some(1),
        _ => None,
    }
}

/// `storeCoins(v)`'s bit-width rule (spec §4.H numeric rule):
/// `⌈log2(v)/8⌉·8 + 4` bits for `v > 0`; `4` bits for `v = 0`.
fn coins_bits(v: &BigInt) -> i64 {
    if v.is_zero() {
        return 4;
    }
    let bits = v.bits();
    let bytes = (bits + 7) / 8;
    (bytes as i64) * 8 + 4
}

/// The storage-delta table (spec §4.H). `storeBuilder`/`storeSlice` need
/// the full state (to look up a tracked source variable), so they're
/// threaded through separately from the table's other rows.
fn apply_delta(state: &CellBoundsState, kind: VarKind, storage: VariableStorage, method: &str, args: &[ExprId], ast: &AstStore) -> VariableStorage {
    match (kind, method) {
        (VarKind::Builder, "storeRef") => storage.add_refs_stored(Interval::exact(1, 1)),
        (VarKind::Builder, "storeMaybeRef") => storage.add_refs_stored(Interval::new(Num::zero(), Num::int(1))),
        (VarKind::Slice, "loadRef") => storage.add_refs_loaded(Interval::exact(1, 1)),
        (VarKind::Builder, "storeCoins") => match constant_arg(args, 0, ast) {
            Some(v) => {
                let bits = coins_bits(&v);
                storage.add_data_stored(Interval::exact(bits, bits))
            }
            None => storage,
        },
        (VarKind::Builder, "storeAddress") => storage.add_data_stored(Interval::exact(267, 267)),
        (VarKind::Builder, "storeBuilder") | (VarKind::Builder, "storeSlice") => merge_store_container(state, storage, args, ast),
        (VarKind::Builder, m) if m.starts_with("store") => match constant_store_size(m, args, ast) {
            Some(n) => storage.add_data_stored(Interval::exact(n, n)),
            None => storage,
        },
        (VarKind::Slice, m) if m.starts_with("load") => match constant_load_size(m, args, ast) {
            Some(n) => storage.add_data_loaded(Interval::exact(n, n)),
            None => storage,
        },
        _ => storage,
    }
}

/// `storeBuilder b` / `storeSlice b`: if `b` is a tracked variable, add
/// its accumulated stored totals; otherwise the whole storage becomes
/// undecidable (spec §4.H table).
fn merge_store_container(state: &CellBoundsState, storage: VariableStorage, args: &[ExprId], ast: &AstStore) -> VariableStorage {
    if let Some(&arg0) = args.first() {
        if let Some(Expr { kind: ExprKind::Identifier(name), .. }) = ast.expr(arg0) {
            if let Some((_, src)) = state.lookup(name) {
                return storage
                    .add_refs_stored(src.refs_num.stored.clone())
                    .add_data_stored(src.data_size.stored.clone());
            }
        }
    }
    tracing::debug!("storeBuilder/storeSlice argument not a tracked variable, marking storage undecidable");
    storage.mark_undecidable()
}

/// Classifies the receiver of a method-call chain (spec §4.H
/// "retrieveVariable"): a known identifier aliases its tracked storage;
/// a library call produces a fresh zero-storage object; a struct/message
/// literal starts with `dataSize` undecidable; anything else produces no
/// variable.
fn retrieve_variable(state: &CellBoundsState, receiver: &Expr) -> Option<(VarKind, VariableStorage)> {
    match &receiver.kind {
        ExprKind::Identifier(name) => state.lookup(name).map(|(k, v)| (k, v.clone())),
        ExprKind::StaticCall { name, args } if args.is_empty() => match name.as_str() {
            "beginCell" => Some((VarKind::Builder, VariableStorage::zero())),
            "emptyCell" => Some((VarKind::Cell, VariableStorage::zero())),
            "emptySlice" => Some((VarKind::Slice, VariableStorage::zero())),
            _ => None,
        },
        ExprKind::StructInstance { .. } => Some((VarKind::StructMessage, VariableStorage::struct_literal())),
        _ => None,
    }
}

/// Walks a method-call chain left to right (spec §4.H "analyzeCalls"):
/// classifies the receiver, then folds each call's storage delta and any
/// kind transition into a running `(kind, storage)` pair, recording the
/// pre-transition variable as an intermediate whenever the kind changes.
/// Returns the final `(kind, storage)` plus the intermediates produced
/// along the way, or `None` if the receiver doesn't resolve to a
/// variable at all (spec: "no variable produced; no state change").
fn walk_chain(state: &CellBoundsState, ast: &AstStore, receiver_id: ExprId, calls: &[&Expr]) -> Option<(VarKind, VariableStorage, Vec<(VarKind, VariableStorage)>)> {
    let receiver_expr = ast.expr(receiver_id)?;
    let (mut kind, mut storage) = retrieve_variable(state, receiver_expr)?;
    let mut intermediates: Vec<(VarKind, VariableStorage)> = Vec::new();

    for call in calls {
        let ExprKind::MethodCall { method, args, .. } = &call.kind else {
            continue;
        };
        storage = apply_delta(state, kind, storage, method, args, ast);
        if let Some(new_kind) = transition(kind, method) {
            // A transition call (`endCell`, `asSlice`, ...) never carries
            // its own storage delta, so when nothing between two
            // transitions changed the storage, the prior variable is the
            // same value as the one already recorded — recording it again
            // would double-count the same bug (spec §4.H warns per
            // variable, not per syntactic position).
            let already_recorded = intermediates.last().is_some_and(|(_, prev)| *prev == storage);
            if !already_recorded {
                intermediates.push((kind, storage.clone()));
            }
            kind = new_kind;
        }
    }

    // Drop a trailing intermediate identical to the final storage: the
    // chain ended right after a transition with no further call to
    // change it, so the pre-transition variable and the bound result are
    // the same value observed twice.
    if intermediates.last().is_some_and(|(_, prev)| *prev == storage) {
        intermediates.pop();
    }

    Some((kind, storage, intermediates))
}

fn chain_of(value_expr: &Expr, ast: &AstStore, value_id: ExprId) -> (ExprId, Vec<&Expr>) {
    match value_expr.as_method_chain(ast) {
        Some((receiver, calls)) => (receiver, calls),
        None => (value_id, Vec::new()),
    }
}

/// `let x = e` / `x = e` (spec §4.H): resolve the chain rooted at `e`,
/// then bind the final variable to `x`. Assignment only takes effect if
/// `x` is already tracked.
fn process_let_or_assign(state: &mut CellBoundsState, name: &str, value: ExprId, ast: &AstStore, is_let: bool) {
    if !is_let && !state.is_tracked(name) {
        return;
    }
    let Some(value_expr) = ast.expr(value) else {
        return;
    };
    let (receiver_id, calls) = chain_of(value_expr, ast, value);
    let Some((kind, storage, intermediates)) = walk_chain(state, ast, receiver_id, &calls) else {
        return;
    };
    state.intermediates.extend(intermediates);
    state.bind(name, kind, storage);
}

/// A chain that appears anywhere else in a statement, not bound to a
/// name: every variable produced along it — including the final one —
/// becomes an intermediate (spec §4.H).
fn process_orphan_chain(state: &mut CellBoundsState, ast: &AstStore, receiver_id: ExprId, calls: &[&Expr]) {
    if let Some((kind, storage, mut intermediates)) = walk_chain(state, ast, receiver_id, calls) {
        intermediates.push((kind, storage));
        state.intermediates.extend(intermediates);
    }
}

/// Recurses through an expression tree looking for method-call chains
/// that haven't already been processed as part of a longer chain (spec
/// §4.H "record processed call-expression ids in a per-statement set;
/// skip chains whose first call was already processed").
fn walk_orphans(state: &mut CellBoundsState, expr_id: ExprId, ast: &AstStore, processed: &mut HashSet<ExprId>) {
    if processed.contains(&expr_id) {
        return;
    }
    let Some(expr) = ast.expr(expr_id) else {
        return;
    };
    match &expr.kind {
        ExprKind::MethodCall { .. } => {
            if let Some((receiver_id, calls)) = expr.as_method_chain(ast) {
                for call in &calls {
                    processed.insert(call.id);
                }
                process_orphan_chain(state, ast, receiver_id, &calls);
                walk_orphans(state, receiver_id, ast, processed);
                for call in &calls {
                    if let ExprKind::MethodCall { args, .. } = &call.kind {
                        for arg in args {
                            walk_orphans(state, *arg, ast, processed);
                        }
                    }
                }
            }
        }
        ExprKind::Binary { left, right, .. } => {
            walk_orphans(state, *left, ast, processed);
            walk_orphans(state, *right, ast, processed);
        }
        ExprKind::Unary { operand, .. } => walk_orphans(state, *operand, ast, processed),
        ExprKind::FieldAccess { base, .. } => walk_orphans(state, *base, ast, processed),
        ExprKind::StaticCall { args, .. } => {
            for arg in args {
                walk_orphans(state, *arg, ast, processed);
            }
        }
        ExprKind::StructInstance { fields, .. } => {
            for f in fields {
                walk_orphans(state, f.value, ast, processed);
            }
        }
        ExprKind::Conditional { cond, then_branch, else_branch } => {
            walk_orphans(state, *cond, ast, processed);
            walk_orphans(state, *then_branch, ast, processed);
            walk_orphans(state, *else_branch, ast, processed);
        }
        ExprKind::InitOf { args, .. } => {
            for arg in args {
                walk_orphans(state, *arg, ast, processed);
            }
        }
        ExprKind::Identifier(_) | ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Str(_) | ExprKind::Null => {}
    }
}

/// The top-level subexpressions of a statement that isn't a `let`/
/// `assign` (spec §4.H "Any other statement — run `analyzeCalls` over
/// its subexpressions in search of orphan chains").
fn statement_subexpressions(stmt: &Stmt) -> Vec<ExprId> {
    match &stmt.kind {
        StmtKind::Let { value, .. } | StmtKind::Assign { value, .. } => vec![*value],
        StmtKind::AugmentedAssign { value, .. } => vec![*value],
        StmtKind::Return { value } => value.iter().copied().collect(),
        StmtKind::Expression { expr } => vec![*expr],
        StmtKind::Condition { cond, .. } => vec![*cond],
        StmtKind::While { cond, .. } | StmtKind::Until { cond, .. } => vec![*cond],
        StmtKind::Repeat { count, .. } => vec![*count],
        StmtKind::Foreach { collection, .. } => vec![*collection],
        StmtKind::Try { .. } | StmtKind::TryCatch { .. } => vec![],
    }
}

/// The transfer function (spec §4.H, §4.F): deep-clones the input state,
/// clears the statement-local intermediates, then dispatches on
/// statement kind.
pub struct CellBoundsTransfer;

impl TransferFunction for CellBoundsTransfer {
    type State = CellBoundsState;

    fn transfer(&self, in_state: &CellBoundsState, _cfg: &Cfg, _block: &Block, stmt_id: crate::domain::StmtId, ast: &AstStore) -> CellBoundsState {
        let mut state = in_state.clone();
        state.intermediates.clear();

        let Some(stmt) = ast.stmt(stmt_id) else {
            return state;
        };

        match &stmt.kind {
            StmtKind::Let { name, value } => process_let_or_assign(&mut state, name, *value, ast, true),
            StmtKind::Assign { target, value } => process_let_or_assign(&mut state, target, *value, ast, false),
            _ => {
                let mut processed = HashSet::new();
                for expr_id in statement_subexpressions(stmt) {
                    walk_orphans(&mut state, expr_id, ast, &mut processed);
                }
            }
        }

        state
    }
}

/// spec §4.H warning-generation table.
fn check_storage(storage: &VariableStorage, span: &Span) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let refs = &storage.refs_num;
    if !refs.undecidable {
        if refs.stored.sub(&refs.loaded).high < Num::zero() {
            warnings.push(
                Warning::new("Reference count might go below 0", Severity::Critical, Category::Correctness, span.clone())
                    .with_description("a store/load sequence may leave the cell's reference count negative"),
            );
        }
        if refs.stored.low > Num::int(MAX_REFS) {
            warnings.push(
                Warning::new("Too many references stored in cell", Severity::Critical, Category::Correctness, span.clone())
                    .with_description(format!("a cell holds at most {MAX_REFS} references")),
            );
        }
    }

    let data = &storage.data_size;
    if !data.undecidable {
        if data.stored.sub(&data.loaded).high < Num::zero() {
            warnings.push(
                Warning::new("Data size might go below 0", Severity::Critical, Category::Correctness, span.clone())
                    .with_description("a store/load sequence may leave the cell's data size negative"),
            );
        }
        if data.stored.low > Num::int(MAX_DATA_BITS) {
            warnings.push(
                Warning::new("Data size exceeds cell capacity", Severity::Critical, Category::Correctness, span.clone())
                    .with_description(format!("a cell holds at most {MAX_DATA_BITS} data bits")),
            );
        }
    }

    warnings
}

/// The cell-bounds detector (spec §4.H): runs the forward worklist
/// solver to a fixpoint, then recomputes each block's output once more
/// from its (now-stable) input state to recover the statement-local
/// intermediates for warning generation — cheap, since `transfer` is
/// pure, and exact, since by the time the solver stops, every block's
/// recorded input already reflects its predecessors' final outputs
/// (spec §8 "Fixpoint").
pub struct CellBoundsDetector;

impl CellBoundsDetector {
    fn warnings_for_cfg(cfg: &Cfg, ast: &AstStore) -> Vec<Warning> {
        let transfer = CellBoundsTransfer;
        let results = solve(cfg, ast, &transfer, Direction::Forward, &JoinCombinator);

        let mut warnings = Vec::new();
        for block in cfg.blocks() {
            let Some(input) = results.states_in.get(&block.id) else {
                continue;
            };
            let output = transfer.transfer(input, cfg, block, block.stmt, ast);
            for var in output.all_variables() {
                warnings.extend(check_storage(var, &block.span));
            }
        }
        warnings
    }
}

impl Detector for CellBoundsDetector {
    fn id(&self) -> &'static str {
        "cell-bounds"
    }

    fn analyze_cfg(&self, cfg: &Cfg, ast: &AstStore) -> Vec<Warning> {
        Self::warnings_for_cfg(cfg, ast)
    }
}
