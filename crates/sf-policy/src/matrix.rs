// matrix.rs — Static probability × impact lookup table.
//
// A linear scan over rows in declaration order; the first row whose
// half-open probability AND impact ranges both contain the point wins.
// Points no row covers (e.g. probability or impact exactly 1.0) fall back
// to the last row of the default table: CRITICAL / block.
//
// This path classifies a raw probability/impact pair. It is separate from
// the assessor's bucketing of its blended combined score, and the two are
// not expected to agree.

use serde::{Deserialize, Serialize};

use crate::model::{RiskScore, Severity};

pub const DEFAULT_APPROVAL_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MitigationAction {
    None,
    Monitor,
    Alert,
    Restrict,
    Block,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MitigationStrategy {
    pub action: MitigationAction,
    pub description: String,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default = "default_timeout")]
    pub approval_timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_APPROVAL_TIMEOUT_SECS
}

impl MitigationStrategy {
    pub fn new(action: MitigationAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
            requires_approval: false,
            approval_timeout_seconds: DEFAULT_APPROVAL_TIMEOUT_SECS,
        }
    }

    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

/// One row: `[min, max)` ranges for probability and impact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskMatrixEntry {
    pub probability_range: (f64, f64),
    pub impact_range: (f64, f64),
    pub severity: Severity,
    pub mitigation: MitigationStrategy,
}

impl RiskMatrixEntry {
    pub fn contains(&self, probability: f64, impact: f64) -> bool {
        let (p_min, p_max) = self.probability_range;
        let (i_min, i_max) = self.impact_range;
        (p_min..p_max).contains(&probability) && (i_min..i_max).contains(&impact)
    }
}

/// The built-in seven-row table.
pub fn default_entries() -> Vec<RiskMatrixEntry> {
    let row = |p: (f64, f64), i: (f64, f64), severity, mitigation| RiskMatrixEntry {
        probability_range: p,
        impact_range: i,
        severity,
        mitigation,
    };
    let alert = || MitigationStrategy::new(MitigationAction::Alert, "medium risk, send an alert");
    let restrict = || {
        MitigationStrategy::new(MitigationAction::Restrict, "high risk, approval required")
            .requiring_approval()
    };

    vec![
        row(
            (0.0, 0.1),
            (0.0, 1.0),
            Severity::Low,
            MitigationStrategy::new(MitigationAction::None, "acceptable risk, proceed normally"),
        ),
        row(
            (0.1, 0.3),
            (0.0, 0.5),
            Severity::Low,
            MitigationStrategy::new(MitigationAction::Monitor, "low risk, keep monitoring"),
        ),
        row((0.1, 0.3), (0.5, 1.0), Severity::Medium, alert()),
        row((0.3, 0.6), (0.0, 0.5), Severity::Medium, alert()),
        row((0.3, 0.6), (0.5, 1.0), Severity::High, restrict()),
        row((0.6, 1.0), (0.0, 0.5), Severity::High, restrict()),
        row(
            (0.6, 1.0),
            (0.5, 1.0),
            Severity::Critical,
            MitigationStrategy::new(MitigationAction::Block, "critical risk, block execution"),
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct RiskMatrix {
    entries: Vec<RiskMatrixEntry>,
    fallback: RiskMatrixEntry,
}

impl RiskMatrix {
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    /// A matrix over custom rows. An empty list means the default table.
    pub fn with_entries(entries: Vec<RiskMatrixEntry>) -> Self {
        let defaults = default_entries();
        let fallback = critical_row(&defaults);
        let entries = if entries.is_empty() { defaults } else { entries };
        Self { entries, fallback }
    }

    fn find_entry(&self, probability: f64, impact: f64) -> &RiskMatrixEntry {
        self.entries
            .iter()
            .find(|entry| entry.contains(probability, impact))
            .unwrap_or(&self.fallback)
    }

    /// The pair as a category-less score.
    pub fn get_score(&self, probability: f64, impact: f64) -> RiskScore {
        RiskScore {
            probability,
            impact,
            category: None,
        }
    }

    pub fn get_mitigation(&self, score: &RiskScore) -> &MitigationStrategy {
        &self.find_entry(score.probability, score.impact).mitigation
    }

    pub fn get_severity(&self, probability: f64, impact: f64) -> Severity {
        self.find_entry(probability, impact).severity
    }

    /// Append a row. Rows are scanned in order, so it only wins for points
    /// no earlier row covers.
    pub fn add_entry(&mut self, entry: RiskMatrixEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RiskMatrixEntry] {
        &self.entries
    }
}

impl Default for RiskMatrix {
    fn default() -> Self {
        Self::new()
    }
}

fn critical_row(defaults: &[RiskMatrixEntry]) -> RiskMatrixEntry {
    match defaults.last() {
        Some(row) => row.clone(),
        None => RiskMatrixEntry {
            probability_range: (0.6, 1.0),
            impact_range: (0.5, 1.0),
            severity: Severity::Critical,
            mitigation: MitigationStrategy::new(MitigationAction::Block, "block execution"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_seven_rows() {
        assert_eq!(RiskMatrix::new().entries().len(), 7);
    }

    #[test]
    fn low_corner_is_low_with_no_mitigation() {
        let matrix = RiskMatrix::new();
        assert_eq!(matrix.get_severity(0.05, 0.05), Severity::Low);
        let score = matrix.get_score(0.05, 0.05);
        assert_eq!(matrix.get_mitigation(&score).action, MitigationAction::None);
    }

    #[test]
    fn high_corner_blocks() {
        let matrix = RiskMatrix::new();
        assert_eq!(matrix.get_severity(0.8, 0.8), Severity::Critical);
        let mitigation = matrix.get_mitigation(&matrix.get_score(0.8, 0.8));
        assert_eq!(mitigation.action, MitigationAction::Block);
        assert!(!mitigation.requires_approval);
    }

    #[test]
    fn mid_high_cell_requires_approval() {
        let matrix = RiskMatrix::new();
        assert_eq!(matrix.get_severity(0.4, 0.7), Severity::High);
        let mitigation = matrix.get_mitigation(&matrix.get_score(0.4, 0.7));
        assert_eq!(mitigation.action, MitigationAction::Restrict);
        assert!(mitigation.requires_approval);
        assert_eq!(mitigation.approval_timeout_seconds, 300);
    }

    #[test]
    fn ranges_are_half_open() {
        let matrix = RiskMatrix::new();
        // 0.1 belongs to the second band, not the first.
        assert_eq!(matrix.get_severity(0.1, 0.6), Severity::Medium);
        assert_eq!(matrix.get_severity(0.3, 0.2), Severity::Medium);
    }

    #[test]
    fn upper_bound_falls_back_to_critical() {
        let matrix = RiskMatrix::new();
        assert_eq!(matrix.get_severity(1.0, 0.2), Severity::Critical);
        assert_eq!(matrix.get_severity(0.05, 1.0), Severity::Critical);
        let mitigation = matrix.get_mitigation(&matrix.get_score(1.0, 1.0));
        assert_eq!(mitigation.action, MitigationAction::Block);
    }

    #[test]
    fn custom_table_falls_back_to_default_critical_row() {
        let matrix = RiskMatrix::with_entries(vec![RiskMatrixEntry {
            probability_range: (0.0, 0.5),
            impact_range: (0.0, 0.5),
            severity: Severity::Medium,
            mitigation: MitigationStrategy::new(MitigationAction::Monitor, "watch"),
        }]);
        assert_eq!(matrix.entries().len(), 1);
        assert_eq!(matrix.get_severity(0.1, 0.1), Severity::Medium);
        assert_eq!(matrix.get_severity(0.9, 0.1), Severity::Critical);
    }

    #[test]
    fn added_entry_covers_gaps_only() {
        let mut matrix = RiskMatrix::new();
        matrix.add_entry(RiskMatrixEntry {
            probability_range: (1.0, 1.01),
            impact_range: (0.0, 1.01),
            severity: Severity::High,
            mitigation: MitigationStrategy::new(MitigationAction::Restrict, "cap"),
        });
        assert_eq!(matrix.get_severity(1.0, 0.2), Severity::High);
        assert_eq!(matrix.get_severity(0.05, 0.05), Severity::Low);
    }
}
