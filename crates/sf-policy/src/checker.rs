// checker.rs — Constraint checker.
//
// Holds the hard, soft and custom constraint lists and evaluates an action's
// description against them. Two soft scoring conventions coexist and both
// matter:
//
// - Each soft constraint passes iff its own 1.0-minus-penalty score reaches
//   its weight (see constraint.rs).
// - The combined result's `soft_constraints_score` is the FRACTION of soft
//   constraints that passed, and `overall_passed` requires it to be >= 0.6.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constraint::{
    baseline_hard_constraints, baseline_soft_constraints, Constraint, ConstraintType,
};
use crate::intent::{Action, StructuredIntent};

/// Fixed floor for the fraction of soft constraints that must pass.
pub const SOFT_PASS_FLOOR: f64 = 0.6;

/// Result of one constraint against one description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintCheckResult {
    pub constraint_id: String,
    pub constraint_name: String,
    pub constraint_type: ConstraintType,
    pub passed: bool,
    #[serde(default)]
    pub reason: String,
    pub score: f64,
}

/// Per-list report from `check_hard_constraints` / `check_soft_constraints`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub checks: Vec<ConstraintCheckResult>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub score: f64,
}

/// Hard and soft results for one action, as embedded in a decision record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedCheckResult {
    pub hard_constraints_passed: bool,
    /// Fraction of soft constraints that passed; 1.0 when there are none.
    pub soft_constraints_score: f64,
    pub results: Vec<ConstraintCheckResult>,
    /// Hard failure reasons, in catalog order.
    #[serde(default)]
    pub violations: Vec<String>,
    /// Soft failure reasons, in catalog order.
    #[serde(default)]
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CombinedCheckResult {
    pub fn overall_passed(&self) -> bool {
        self.hard_constraints_passed && self.soft_constraints_score >= SOFT_PASS_FLOOR
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintChecker {
    hard: Vec<Constraint>,
    soft: Vec<Constraint>,
    custom: Vec<Constraint>,
}

impl ConstraintChecker {
    /// A checker seeded with the baseline hard and soft catalogs.
    pub fn new() -> Self {
        Self {
            hard: baseline_hard_constraints(),
            soft: baseline_soft_constraints(),
            custom: Vec::new(),
        }
    }

    /// A checker with no constraints at all.
    pub fn empty() -> Self {
        Self {
            hard: Vec::new(),
            soft: Vec::new(),
            custom: Vec::new(),
        }
    }

    pub fn check_hard_constraints(&self, action: &Action) -> ValidationResult {
        let checks = evaluate_all(&self.hard, &action.description);
        let errors: Vec<String> = checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.reason.clone())
            .collect();
        let valid = errors.is_empty();
        ValidationResult {
            valid,
            checks,
            errors,
            warnings: Vec::new(),
            score: if valid { 1.0 } else { 0.0 },
        }
    }

    /// Soft report scored as the weight-averaged pass score (1.0 for a pass,
    /// 0.5 for a failure). Not used by `check_all` or the decision policy.
    pub fn check_soft_constraints(&self, action: &Action) -> ValidationResult {
        let checks = evaluate_all(&self.soft, &action.description);

        let mut total_score = 0.0;
        let mut total_weight = 0.0;
        for (constraint, check) in self.soft.iter().zip(&checks) {
            let pass_score = if check.passed { 1.0 } else { 0.5 };
            total_score += pass_score * constraint.weight;
            total_weight += constraint.weight;
        }
        let score = if total_weight > 0.0 {
            total_score / total_weight
        } else {
            1.0
        };

        let warnings = checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.reason.clone())
            .collect();

        ValidationResult {
            valid: score >= SOFT_PASS_FLOOR,
            checks,
            errors: Vec::new(),
            warnings,
            score,
        }
    }

    pub fn check_all(&self, action: &Action) -> CombinedCheckResult {
        let hard = evaluate_all(&self.hard, &action.description);
        let soft = evaluate_all(&self.soft, &action.description);

        let violations: Vec<String> = hard
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.reason.clone())
            .collect();
        let warnings: Vec<String> = soft
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.reason.clone())
            .collect();

        let soft_constraints_score = if soft.is_empty() {
            1.0
        } else {
            soft.iter().filter(|c| c.passed).count() as f64 / soft.len() as f64
        };

        tracing::debug!(
            "constraint check for action {}: {} violation(s), {} warning(s), soft score {:.2}",
            action.id,
            violations.len(),
            warnings.len(),
            soft_constraints_score
        );

        let mut results = hard;
        results.extend(soft);

        CombinedCheckResult {
            hard_constraints_passed: violations.is_empty(),
            soft_constraints_score,
            results,
            violations,
            warnings,
            created_at: Utc::now(),
        }
    }

    pub fn check_intent(&self, intent: &StructuredIntent) -> CombinedCheckResult {
        self.check_all(&Action::for_intent(intent))
    }

    /// Append to the custom list and to the list matching its type.
    pub fn add_custom_constraint(&mut self, constraint: Constraint) {
        match constraint.constraint_type {
            ConstraintType::Hard => self.hard.push(constraint.clone()),
            ConstraintType::Soft => self.soft.push(constraint.clone()),
        }
        self.custom.push(constraint);
    }

    /// Remove the first constraint with `id`, scanning hard, soft, then
    /// custom. Only one entry is removed, so a custom constraint stays in
    /// the custom list after its hard/soft copy is gone.
    pub fn remove_constraint(&mut self, id: &str) -> bool {
        for list in [&mut self.hard, &mut self.soft, &mut self.custom] {
            if let Some(pos) = list.iter().position(|c| c.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn hard_constraints(&self) -> &[Constraint] {
        &self.hard
    }

    pub fn soft_constraints(&self) -> &[Constraint] {
        &self.soft
    }

    pub fn custom_constraints(&self) -> &[Constraint] {
        &self.custom
    }
}

impl Default for ConstraintChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn evaluate_all(constraints: &[Constraint], description: &str) -> Vec<ConstraintCheckResult> {
    constraints
        .iter()
        .map(|constraint| {
            let outcome = constraint.evaluate(description);
            ConstraintCheckResult {
                constraint_id: constraint.id.clone(),
                constraint_name: constraint.name.clone(),
                constraint_type: constraint.constraint_type,
                passed: outcome.passed,
                reason: outcome.reason,
                score: outcome.score,
            }
        })
        .collect()
}
