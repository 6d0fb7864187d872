// alignment.rs — Value alignment evaluator.
//
// Turns per-value compliance into one threshold-gated verdict. Two
// aggregation paths exist and they are not expected to agree:
//
// - `evaluate()`: weighted mean over the whole catalog:
//   Σ(score × weight) / Σ(weight), 0.0 when the total weight is 0.
//   This is the score the decision coordinator gates on.
// - `check_alignment()`: unweighted arithmetic mean over the supplied
//   values (or the whole catalog), for reporting and recommendations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::StructuredIntent;
use crate::values::{CoreValue, ValueGraph};

/// Default pass threshold for alignment scores.
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 0.8;

/// Compliance of one value within an assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentScore {
    pub value_name: String,
    pub score: f64,
    pub weight: f64,
    pub weighted_score: f64,
    #[serde(default)]
    pub violations: Vec<String>,
}

/// Result of `AlignmentEvaluator::evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentAssessment {
    /// Weighted mean compliance in [0, 1].
    pub overall_score: f64,
    pub alignment_scores: Vec<AlignmentScore>,
    pub passed: bool,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
}

impl AlignmentAssessment {
    /// Every per-value violation, in catalog order.
    pub fn violations(&self) -> Vec<String> {
        self.alignment_scores
            .iter()
            .flat_map(|s| s.violations.iter().cloned())
            .collect()
    }
}

/// Result of the unweighted reporting path, `check_alignment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub passed: bool,
    pub threshold: f64,
    /// Compliance per value name.
    pub details: BTreeMap<String, f64>,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Evaluates intents against a value catalog.
///
/// The threshold is instance state: `set_threshold` affects every later call.
#[derive(Debug, Clone)]
pub struct AlignmentEvaluator {
    threshold: f64,
    value_graph: ValueGraph,
}

impl AlignmentEvaluator {
    /// An evaluator over the baseline catalog.
    pub fn new(threshold: f64) -> Self {
        Self::with_graph(threshold, ValueGraph::new())
    }

    pub fn with_graph(threshold: f64, value_graph: ValueGraph) -> Self {
        Self {
            threshold,
            value_graph,
        }
    }

    pub fn evaluate(&self, intent: &StructuredIntent) -> AlignmentAssessment {
        let behavior = &intent.parsed_intent;
        let mut alignment_scores = Vec::with_capacity(self.value_graph.values().len());
        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;

        for value in self.value_graph.values() {
            let score = value.evaluate_compliance(behavior);
            let weighted_score = score * value.weight;

            let mut violations = Vec::new();
            if score < self.threshold {
                violations.push(format!("violates value '{}'", value.description));
            }

            alignment_scores.push(AlignmentScore {
                value_name: value.name.clone(),
                score,
                weight: value.weight,
                weighted_score,
                violations,
            });

            total_weighted += weighted_score;
            total_weight += value.weight;
        }

        let overall_score = if total_weight > 0.0 {
            total_weighted / total_weight
        } else {
            0.0
        };

        AlignmentAssessment {
            overall_score,
            alignment_scores,
            passed: overall_score >= self.threshold,
            threshold: self.threshold,
            created_at: Utc::now(),
        }
    }

    /// Unweighted compliance report for `behavior`.
    ///
    /// `values` defaults to the whole catalog. An empty set scores 0.0.
    pub fn check_alignment(&self, behavior: &str, values: Option<&[CoreValue]>) -> EvaluationResult {
        let values = values.unwrap_or_else(|| self.value_graph.values());
        let details: BTreeMap<String, f64> = values
            .iter()
            .map(|v| (v.name.clone(), v.evaluate_compliance(behavior)))
            .collect();

        let score = if details.is_empty() {
            0.0
        } else {
            details.values().sum::<f64>() / details.len() as f64
        };

        let recommendations = details
            .iter()
            .filter(|(_, score)| **score < self.threshold)
            .map(|(name, _)| format!("improve compliance with '{}'", name))
            .collect();

        EvaluationResult {
            score,
            passed: score >= self.threshold,
            threshold: self.threshold,
            details,
            recommendations,
            created_at: Utc::now(),
        }
    }

    /// Upsert a value into the catalog.
    pub fn add_custom_value(&mut self, value: CoreValue) {
        self.value_graph.add_value(value);
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn value_graph(&self) -> &ValueGraph {
        &self.value_graph
    }

    pub fn value_graph_mut(&mut self) -> &mut ValueGraph {
        &mut self.value_graph
    }
}

impl Default for AlignmentEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_ALIGNMENT_THRESHOLD)
    }
}
