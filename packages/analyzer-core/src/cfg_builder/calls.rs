//! Call-target resolution (spec §4.D): walks an expression collecting
//! free-function names and method calls whose receiver is a known
//! contract name, resolving each against the enclosing compilation
//! unit's name maps. Names that don't resolve (dynamic dispatch,
//! external calls) are logged at debug level and simply omitted — this
//! function never fails (spec §7 category 4: detector-internal policy).

use crate::common::CfgId;
use crate::domain::{AstStore, ExprId, ExprKind};
use rustc_hash::FxHashMap;
use std::collections::HashSet;

/// Free-function name -> its CFG id, preregistered before any CFG body is
/// built so forward references resolve (spec §4.D "Preregister a CFG id
/// for every function/method/receive").
pub type FunctionNames = FxHashMap<String, CfgId>;
/// `(contract_name, method_name) -> CFG id`.
pub type MethodNames = FxHashMap<(String, String), CfgId>;

/// Collects every resolvable call target reachable from `expr`, recursing
/// into all subexpressions (arguments, operands, struct-literal field
/// values) so a chain like `f(g(x))` or `self.a().b(c())` yields every
/// resolvable callee, not just the outermost call.
pub fn collect_callees(
    expr: ExprId,
    ast: &AstStore,
    functions: &FunctionNames,
    methods: &MethodNames,
    out: &mut HashSet<CfgId>,
) {
    let Some(e) = ast.expr(expr) else {
        return;
    };
    match &e.kind {
        ExprKind::StaticCall { name, args } => {
            match functions.get(name) {
                Some(cfg_id) => {
                    out.insert(*cfg_id);
                }
                None => {
                    tracing::debug!(call = %name, "unresolved static call target");
                }
            }
            for arg in args {
                collect_callees(*arg, ast, functions, methods, out);
            }
        }
        ExprKind::MethodCall {
            receiver,
            method,
            args,
        } => {
            if let Some(receiver_expr) = ast.expr(*receiver) {
                if let ExprKind::Identifier(name) = &receiver_expr.kind {
                    match methods.get(&(name.clone(), method.clone())) {
                        Some(cfg_id) => {
                            out.insert(*cfg_id);
                        }
                        None => {
                            tracing::debug!(
                                receiver = %name,
                                method = %method,
                                "unresolved method call target"
                            );
                        }
                    }
                }
            }
            collect_callees(*receiver, ast, functions, methods, out);
            for arg in args {
                collect_callees(*arg, ast, functions, methods, out);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            collect_callees(*left, ast, functions, methods, out);
            collect_callees(*right, ast, functions, methods, out);
        }
        ExprKind::Unary { operand, .. } => {
            collect_callees(*operand, ast, functions, methods, out);
        }
        ExprKind::FieldAccess { base, .. } => {
            collect_callees(*base, ast, functions, methods, out);
        }
        ExprKind::StructInstance { fields, .. } => {
            for f in fields {
                collect_callees(f.value, ast, functions, methods, out);
            }
        }
        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_callees(*cond, ast, functions, methods, out);
            collect_callees(*then_branch, ast, functions, methods, out);
            collect_callees(*else_branch, ast, functions, methods, out);
        }
        ExprKind::InitOf { args, .. } => {
            for arg in args {
                collect_callees(*arg, ast, functions, methods, out);
            }
        }
        ExprKind::Identifier(_) | ExprKind::Number(_) | ExprKind::Boolean(_) | ExprKind::Str(_) | ExprKind::Null => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{IdAllocator, Span};
    use crate::domain::{AstStore, Expr, ExprKind};

    #[test]
    fn unresolved_static_call_is_omitted_not_an_error() {
        let mut ids = IdAllocator::new();
        let mut builder = AstStore::builder();
        let expr_id = ids.next_node();
        builder.add_expr(Expr {
            id: expr_id,
            kind: ExprKind::StaticCall {
                name: "unknownFn".into(),
                args: vec![],
            },
            span: Span::zero(),
        });
        let ast = builder.build();

        let mut out = HashSet::new();
        collect_callees(expr_id, &ast, &FunctionNames::default(), &MethodNames::default(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn resolves_known_static_call() {
        let mut ids = IdAllocator::new();
        let mut builder = AstStore::builder();
        let expr_id = ids.next_node();
        builder.add_expr(Expr {
            id: expr_id,
            kind: ExprKind::StaticCall {
                name: "helper".into(),
                args: vec![],
            },
            span: Span::zero(),
        });
        let ast = builder.build();

        let mut functions = FunctionNames::default();
        functions.insert("helper".into(), CfgId(7));
        let mut out = HashSet::new();
        collect_callees(expr_id, &ast, &functions, &MethodNames::default(), &mut out);
        assert_eq!(out.len(), 1);
        assert!(out.contains(&CfgId(7)));
    }
}
