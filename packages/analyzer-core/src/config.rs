//! Analysis configuration (spec §6): the options the core recognizes,
//! independent of how the out-of-scope driver loads or serializes them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `souffle_path`, `detectors_enabled`, `include_stdlib` (spec §6). A plain
/// value type: no YAML loading, field provenance, or preset tiers — that
/// layer belongs to the driver, not the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the Datalog back-end binary. Ignored by the core; carried
    /// through for the out-of-scope driver.
    pub souffle_path: Option<PathBuf>,
    /// Detector identifiers to run (spec §4.I, matches `Detector::id`).
    pub detectors_enabled: Vec<String>,
    /// Whether standard-library CFGs are analyzed alongside user code.
    pub include_stdlib: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            souffle_path: None,
            detectors_enabled: vec!["cell-bounds".to_string()],
            include_stdlib: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detectors(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.detectors_enabled = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_stdlib(mut self, include: bool) -> Self {
        self.include_stdlib = include;
        self
    }

    pub fn with_souffle_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.souffle_path = Some(path.into());
        self
    }

    pub fn is_enabled(&self, detector_id: &str) -> bool {
        self.detectors_enabled.iter().any(|id| id == detector_id)
    }
}
