//! The warning model (spec §3.6, §4.G).

use crate::common::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Security,
    BestPractices,
    Correctness,
    Performance,
}

/// A single analysis finding, emitted only after a detector finishes its
/// pass (spec §4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub title: String,
    pub severity: Severity,
    pub category: Category,
    pub location: Span,
    pub description: Option<String>,
    pub suggestion: Option<String>,
}

impl Warning {
    pub fn new(title: impl Into<String>, severity: Severity, category: Category, location: Span) -> Self {
        Self {
            title: title.into(),
            severity,
            category,
            location,
            description: None,
            suggestion: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Sorts by descending severity and removes duplicate `(title, location)`
/// pairs, in that order (spec §4.I).
pub fn sort_and_dedup(mut warnings: Vec<Warning>) -> Vec<Warning> {
    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    let mut seen: std::collections::HashSet<(String, Span)> = std::collections::HashSet::new();
    warnings.retain(|w| seen.insert((w.title.clone(), w.location.clone())));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(title: &str, sev: Severity, span: Span) -> Warning {
        Warning::new(title, sev, Category::Security, span)
    }

    #[test]
    fn sorts_descending_by_severity() {
        let warnings = vec![
            w("a", Severity::Low, Span::zero()),
            w("b", Severity::Critical, Span::zero()),
            w("c", Severity::Medium, Span::zero()),
        ];
        let sorted = sort_and_dedup(warnings);
        assert_eq!(sorted[0].title, "b");
        assert_eq!(sorted[1].title, "c");
        assert_eq!(sorted[2].title, "a");
    }

    #[test]
    fn dedups_identical_title_and_location() {
        let span = Span::zero();
        let warnings = vec![
            w("dup", Severity::High, span.clone()),
            w("dup", Severity::High, span.clone()),
            w("dup", Severity::High, Span::point("other.tact", 1, 0)),
        ];
        let result = sort_and_dedup(warnings);
        assert_eq!(result.len(), 2);
    }
}
