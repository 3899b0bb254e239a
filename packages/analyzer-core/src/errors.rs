//! Error taxonomy for the analysis core (spec §7).
//!
//! Only usage errors and internal-invariant violations are represented as
//! `Err`. Analysis imprecision (an `undecidable` value) and detector-internal
//! policy decisions are not errors — see `crate::numeric` and
//! `crate::detectors`.

use thiserror::Error;

/// Errors surfaced by the analysis core.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Malformed input: unknown detector id, unsupported statement or
    /// expression kind, a reference to a node id the AST store doesn't have.
    #[error("usage error: {0}")]
    Usage(String),

    /// A broken invariant — missing statement for a block id, a CFG lookup
    /// for a known id failing. Indicates a bug in the core, not bad input.
    #[error("internal error: {0}")]
    Internal(String),

    /// A recognized but invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    pub fn usage(msg: impl Into<String>) -> Self {
        AnalyzerError::Usage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AnalyzerError::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AnalyzerError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
