//! Static analysis core for Tact-like smart contracts.
//!
//! Lowers a contract's AST to a control-flow graph per function, method, and
//! receiver (`cfg_builder`), runs dataflow detectors over each CFG with a
//! worklist fixpoint solver (`solver`, `lattice`, `numeric`), and aggregates
//! the resulting warnings (`host`). The host and its detectors are the only
//! public entry points most callers need; the rest of the modules are the
//! machinery they're built from.

pub mod cfg_builder;
pub mod common;
pub mod config;
pub mod detectors;
pub mod domain;
pub mod errors;
pub mod host;
pub mod ir;
pub mod lattice;
pub mod numeric;
pub mod solver;
pub mod transfer;
pub mod warning;

pub use config::Config;
pub use errors::{AnalyzerError, Result};
pub use host::Host;
pub use warning::Warning;
