//! The detector host (spec §4.I): iterates a compilation unit's CFGs,
//! invokes every enabled detector on each, and aggregates the results.
//!
//! Detectors are independent and running order is not observable (spec
//! §4.I), so CFGs are scheduled across a rayon thread pool — the same
//! parallel-iteration style the teacher's pipeline stages use for
//! independent units of work (Design Notes, §5).

use crate::config::Config;
use crate::detectors::{
    CellBoundsDetector, Detector, DuplicateConditionDetector, OverlappingReceiversDetector,
    ReservedExitCodeDetector, TimestampDependentDetector, UnboundedLoopsDetector,
};
use crate::ir::{Cfg, CfgOrigin, CompilationUnit};
use crate::warning::{sort_and_dedup, Warning};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Every detector this crate ships, regardless of whether a given
/// `Config` enables it.
fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(CellBoundsDetector),
        Box::new(UnboundedLoopsDetector),
        Box::new(ReservedExitCodeDetector),
        Box::new(DuplicateConditionDetector),
        Box::new(OverlappingReceiversDetector),
        Box::new(TimestampDependentDetector),
    ]
}

/// Schedules the set of detectors a `Config` enables over a compilation
/// unit's CFGs.
pub struct Host {
    detectors: Vec<Box<dyn Detector>>,
}

impl Host {
    /// Builds a host running exactly the detectors named in
    /// `config.detectors_enabled`. An unrecognized id is silently
    /// ignored — `analyzeCalls` scoped detector enablement is the
    /// driver's concern, not a core invariant.
    pub fn new(config: &Config) -> Self {
        let detectors: Vec<Box<dyn Detector>> = all_detectors()
            .into_iter()
            .filter(|d| config.is_enabled(d.id()))
            .collect();
        debug!(count = detectors.len(), "host configured with detectors");
        Self { detectors }
    }

    /// Runs every enabled detector over every in-scope CFG in the unit,
    /// aggregates the warnings, sorts by descending severity, and
    /// deduplicates identical `(title, location)` pairs (spec §4.I).
    pub fn analyze(&self, unit: &CompilationUnit, config: &Config) -> Vec<Warning> {
        let in_scope: Vec<&Cfg> = unit
            .all_cfgs()
            .filter(|cfg| config.include_stdlib || cfg.origin == CfgOrigin::User)
            .collect();

        trace!(cfgs = in_scope.len(), "scheduling detectors across compilation unit");
        let warnings: Vec<Warning> = in_scope
            .par_iter()
            .flat_map(|cfg| {
                self.detectors
                    .iter()
                    .flat_map(|detector| detector.analyze_cfg(cfg, &unit.ast_store))
                    .collect::<Vec<_>>()
            })
            .collect();

        sort_and_dedup(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CfgId, IdAllocator, Span};
    use crate::domain::{AstStore, Expr, ExprKind, Stmt, StmtKind};
    use crate::ir::CfgKind;

    fn cfg_with_five_store_refs(ast: &mut crate::domain::AstStoreBuilder, ids: &mut IdAllocator, id: CfgId, origin: CfgOrigin) -> Cfg {
        let begin_id = ids.next_node();
        ast.add_expr(Expr {
            id: begin_id,
            kind: ExprKind::StaticCall {
                name: "beginCell".into(),
                args: vec![],
            },
            span: Span::zero(),
        });
        let x_id = ids.next_node();
        ast.add_expr(Expr {
            id: x_id,
            kind: ExprKind::Identifier("x".into()),
            span: Span::zero(),
        });
        let mut chain = begin_id;
        for _ in 0..5 {
            let call_id = ids.next_node();
            ast.add_expr(Expr {
                id: call_id,
                kind: ExprKind::MethodCall {
                    receiver: chain,
                    method: "storeRef".into(),
                    args: vec![x_id],
                },
                span: Span::zero(),
            });
            chain = call_id;
        }
        let end_id = ids.next_node();
        ast.add_expr(Expr {
            id: end_id,
            kind: ExprKind::MethodCall {
                receiver: chain,
                method: "endCell".into(),
                args: vec![],
            },
            span: Span::zero(),
        });
        let stmt_id = ids.next_node();
        ast.add_stmt(Stmt {
            id: stmt_id,
            kind: StmtKind::Let {
                name: "c".into(),
                value: end_id,
            },
            span: Span::zero(),
        });

        let block_id = ids.next_block();
        let mut cfg = Cfg::new(id, "f", CfgKind::Function, origin, Span::zero());
        cfg.add_block(crate::ir::Block::new(
            block_id,
            stmt_id,
            crate::ir::BlockKind::Regular,
            Span::zero(),
        ));
        cfg
    }

    #[test]
    fn disabled_detector_yields_no_warnings() {
        let mut ids = IdAllocator::new();
        let mut ast_builder = AstStore::builder();
        let cfg = cfg_with_five_store_refs(&mut ast_builder, &mut ids, CfgId(0), CfgOrigin::User);
        let ast = ast_builder.build();

        let mut unit = CompilationUnit::new("proj", ast);
        unit.add_function(cfg);

        let config = Config::new().with_detectors(Vec::<String>::new());
        let host = Host::new(&config);
        let warnings = host.analyze(&unit, &config);
        assert!(warnings.is_empty());
    }

    #[test]
    fn enabled_detector_surfaces_warning_from_unit() {
        let mut ids = IdAllocator::new();
        let mut ast_builder = AstStore::builder();
        let cfg = cfg_with_five_store_refs(&mut ast_builder, &mut ids, CfgId(0), CfgOrigin::User);
        let ast = ast_builder.build();

        let mut unit = CompilationUnit::new("proj", ast);
        unit.add_function(cfg);

        let config = Config::default();
        let host = Host::new(&config);
        let warnings = host.analyze(&unit, &config);
        assert!(warnings.iter().any(|w| w.title == "Too many references stored in cell"));
    }

    #[test]
    fn stdlib_cfgs_are_excluded_unless_requested() {
        let mut ids = IdAllocator::new();
        let mut ast_builder = AstStore::builder();
        let cfg = cfg_with_five_store_refs(&mut ast_builder, &mut ids, CfgId(0), CfgOrigin::Stdlib);
        let ast = ast_builder.build();

        let mut unit = CompilationUnit::new("proj", ast);
        unit.add_function(cfg);

        let config = Config::default();
        let host = Host::new(&config);
        assert!(host.analyze(&unit, &config).is_empty());

        let config = config.with_include_stdlib(true);
        let host = Host::new(&config);
        assert!(!host.analyze(&unit, &config).is_empty());
    }
}
