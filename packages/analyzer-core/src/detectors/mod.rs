//! Detectors (spec §4.H and the detector-host contract, §4.I).
//!
//! A detector consumes one CFG plus the compilation unit's immutable AST
//! store and emits warnings. Non-dataflow ("shallow", pattern-matching)
//! detectors are out of scope (spec §1, §2); this crate implements the
//! representative dataflow detector only (spec §4.H), behind the same
//! `Detector` contract the host (§4.I) would schedule any detector
//! through, dataflow or not.

pub mod cell_bounds;

pub use cell_bounds::CellBoundsDetector;

use crate::domain::AstStore;
use crate::ir::Cfg;
use crate::warning::Warning;

/// The interface the detector host (spec §4.I) schedules through.
/// Dataflow detectors wrap the worklist solver (§4.E) internally and
/// recover a `Vec<Warning>` per CFG; a non-dataflow detector would
/// implement this directly over the AST store without touching the
/// solver at all.
pub trait Detector: Send + Sync {
    /// Stable identifier used by `Config::detectors_enabled` (spec §6).
    fn id(&self) -> &'static str;

    fn analyze_cfg(&self, cfg: &Cfg, ast: &AstStore) -> Vec<Warning>;
}

/// Bug classes named in the source system's purpose statement that this
/// crate does not reimplement: syntax-pattern detectors over the raw AST
/// rather than the dataflow framework this crate demonstrates. Registered
/// with the host so `Config::detectors_enabled` and dispatch are exercised
/// end to end; each always reports nothing.
macro_rules! placeholder_detector {
    ($name:ident, $id:literal) => {
        pub struct $name;

        impl Detector for $name {
            fn id(&self) -> &'static str {
                $id
            }

            fn analyze_cfg(&self, _cfg: &Cfg, _ast: &AstStore) -> Vec<Warning> {
                Vec::new()
            }
        }
    };
}

placeholder_detector!(UnboundedLoopsDetector, "unbounded-loops");
placeholder_detector!(ReservedExitCodeDetector, "reserved-exit-code");
placeholder_detector!(DuplicateConditionDetector, "duplicate-condition");
placeholder_detector!(OverlappingReceiversDetector, "overlapping-receivers");
placeholder_detector!(TimestampDependentDetector, "timestamp-dependent");
