// coordinator.rs — Security decision coordinator.
//
// Runs the alignment, constraint and risk engines independently on one
// intent, then applies an ordered veto chain. The first rule that matches
// decides; later rules are not evaluated:
//
//   1. alignment score < alignment threshold   → reject
//   2. any hard constraint failed              → reject
//   3. overall risk CRITICAL                   → reject
//   4. overall risk HIGH                       → request approval
//   5. soft score < constraint threshold       → request approval
//   6. alignment score < 0.9                   → approve (lower confidence)
//   7. otherwise                               → approve
//
// The coordinator keeps no history: each decision is a pure function of the
// engine configuration and the intent, apart from timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentAssessment, AlignmentEvaluator, DEFAULT_ALIGNMENT_THRESHOLD};
use crate::checker::{CombinedCheckResult, ConstraintChecker};
use crate::config::PolicyConfig;
use crate::context::SecurityContext;
use crate::error::PolicyError;
use crate::intent::{Action, StructuredIntent};
use crate::matrix::DEFAULT_APPROVAL_TIMEOUT_SECS;
use crate::model::{Decision, Severity};
use crate::risk::{RiskAssessment, RiskAssessor};

pub const DEFAULT_CONSTRAINT_THRESHOLD: f64 = 0.6;

/// Alignment scores below this approve with a lower-confidence reason.
const HIGH_CONFIDENCE_ALIGNMENT: f64 = 0.9;

/// How many hard-constraint violations a rejection reason quotes.
const QUOTED_VIOLATIONS: usize = 3;

/// Reason given when an action's own approval flag escalates an APPROVE.
pub const APPROVAL_OVERRIDE_REASON: &str = "action requires human approval";

/// The decision record for one evaluation, with every sub-assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityDecision {
    pub intent_id: String,
    pub decision: Decision,
    pub alignment: AlignmentAssessment,
    pub constraints: CombinedCheckResult,
    pub risk: RiskAssessment,
    pub reason: String,
    pub requires_approval: bool,
    /// Advisory; approval collaborators may honor it.
    pub approval_timeout_seconds: u64,
    pub created_at: DateTime<Utc>,
}

impl SecurityDecision {
    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approve
    }

    pub fn is_rejected(&self) -> bool {
        self.decision == Decision::Reject
    }
}

/// A single step in the veto chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationStep {
    /// Which rule was checked (e.g. "alignment", "hard_constraints").
    pub check: String,
    /// "passed", or "matched: ..." for the deciding rule.
    pub outcome: String,
    /// Whether this step decided the outcome.
    pub terminal: bool,
}

/// A decision plus the veto-chain steps evaluated to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub decision: SecurityDecision,
    pub steps: Vec<EvaluationStep>,
}

struct Verdict {
    decision: Decision,
    reason: String,
    requires_approval: bool,
}

#[derive(Debug, Clone)]
pub struct SecurityDecisionCoordinator {
    alignment_threshold: f64,
    constraint_threshold: f64,
    /// Advisory only; never reaches the risk assessor.
    risk_threshold: Severity,
    alignment_engine: AlignmentEvaluator,
    constraint_engine: ConstraintChecker,
    risk_engine: RiskAssessor,
}

impl SecurityDecisionCoordinator {
    /// A coordinator over the baseline catalogs with default thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(
            DEFAULT_ALIGNMENT_THRESHOLD,
            DEFAULT_CONSTRAINT_THRESHOLD,
            Severity::High,
        )
    }

    pub fn with_thresholds(
        alignment_threshold: f64,
        constraint_threshold: f64,
        risk_threshold: Severity,
    ) -> Self {
        Self {
            alignment_threshold,
            constraint_threshold,
            risk_threshold,
            alignment_engine: AlignmentEvaluator::new(alignment_threshold),
            constraint_engine: ConstraintChecker::new(),
            risk_engine: RiskAssessor::new(),
        }
    }

    /// Build a coordinator from a validated config.
    ///
    /// Baseline catalogs are seeded first, then the config is applied in
    /// order: values, relations, constraints, removals, category weights,
    /// keywords, thresholds.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        let t = &config.thresholds;
        let mut coordinator = Self::with_thresholds(t.alignment, t.constraint, t.risk);
        coordinator.risk_engine = RiskAssessor::with_thresholds(t.risk_high, t.risk_critical);

        for value in &config.values {
            coordinator.alignment_engine.add_custom_value(value.clone());
        }
        let graph = coordinator.alignment_engine.value_graph_mut();
        for relation in &config.value_relations {
            graph.add_relation(
                relation.source.clone(),
                relation.target.clone(),
                relation.relation_type.clone(),
                relation.weight,
            );
        }
        for constraint in &config.constraints {
            coordinator
                .constraint_engine
                .add_custom_constraint(constraint.clone());
        }
        for id in &config.removed_constraints {
            if !coordinator.constraint_engine.remove_constraint(id) {
                tracing::warn!("configured removal of unknown constraint '{}'", id);
            }
        }
        for (category, weight) in &config.category_weights {
            coordinator.risk_engine.set_category_weight(*category, *weight);
        }
        for (category, keywords) in &config.risk_keywords {
            coordinator
                .risk_engine
                .add_risk_keywords(*category, keywords.iter().cloned());
        }

        tracing::debug!(
            "coordinator configured: {} value(s), {} hard / {} soft constraint(s)",
            coordinator.alignment_engine.value_graph().values().len(),
            coordinator.constraint_engine.hard_constraints().len(),
            coordinator.constraint_engine.soft_constraints().len()
        );
        Ok(coordinator)
    }

    /// Decide on an intent. The context is accepted but not consulted.
    pub fn make_decision(
        &self,
        intent: &StructuredIntent,
        context: Option<&SecurityContext>,
    ) -> SecurityDecision {
        self.make_decision_with_trace(intent, context).decision
    }

    /// Like `make_decision`, also returning the veto-chain steps evaluated.
    pub fn make_decision_with_trace(
        &self,
        intent: &StructuredIntent,
        _context: Option<&SecurityContext>,
    ) -> DecisionTrace {
        let alignment = self.alignment_engine.evaluate(intent);
        let constraints = self.constraint_engine.check_intent(intent);
        let risk = self.risk_engine.assess_intent(intent);

        let (verdict, steps) = self.combine(&alignment, &constraints, &risk);

        if verdict.decision == Decision::Approve {
            tracing::debug!(
                intent_id = %intent.id,
                decision = %verdict.decision,
                "{}",
                verdict.reason
            );
        } else {
            tracing::info!(
                intent_id = %intent.id,
                decision = %verdict.decision,
                "{}",
                verdict.reason
            );
        }

        DecisionTrace {
            decision: SecurityDecision {
                intent_id: intent.id.clone(),
                decision: verdict.decision,
                alignment,
                constraints,
                risk,
                reason: verdict.reason,
                requires_approval: verdict.requires_approval,
                approval_timeout_seconds: DEFAULT_APPROVAL_TIMEOUT_SECS,
                created_at: Utc::now(),
            },
            steps,
        }
    }

    /// Decide on an action.
    ///
    /// Only the action's description is evaluated. When the action demands
    /// human approval and the decision is exactly APPROVE, it is escalated to
    /// REQUEST_APPROVAL; rejections and existing escalations are untouched.
    pub fn make_decision_for_action(
        &self,
        action: &Action,
        context: Option<&SecurityContext>,
    ) -> SecurityDecision {
        let id = if action.intent_id.is_empty() {
            &action.id
        } else {
            &action.intent_id
        };
        let intent = StructuredIntent::new(action.description.clone()).with_id(id.clone());

        let mut decision = self.make_decision(&intent, context);
        if action.requires_human_approval && decision.decision == Decision::Approve {
            tracing::info!(
                action_id = %action.id,
                "approval escalated: action requires human approval"
            );
            decision.decision = Decision::RequestApproval;
            decision.requires_approval = true;
            decision.reason = APPROVAL_OVERRIDE_REASON.to_string();
        }
        decision
    }

    /// Decide on a bare description and return only the verdict.
    pub fn quick_check(&self, description: &str) -> Decision {
        self.make_decision(&StructuredIntent::new(description), None)
            .decision
    }

    fn combine(
        &self,
        alignment: &AlignmentAssessment,
        constraints: &CombinedCheckResult,
        risk: &RiskAssessment,
    ) -> (Verdict, Vec<EvaluationStep>) {
        let mut steps = Vec::new();
        let score = alignment.overall_score;

        let rules: [(&str, Option<Verdict>); 6] = [
            (
                "alignment",
                (score < self.alignment_threshold).then(|| Verdict {
                    decision: Decision::Reject,
                    reason: format!(
                        "value alignment check failed: {:.2} < {}",
                        score, self.alignment_threshold
                    ),
                    requires_approval: false,
                }),
            ),
            (
                "hard_constraints",
                (!constraints.hard_constraints_passed).then(|| Verdict {
                    decision: Decision::Reject,
                    reason: format!(
                        "hard constraint violation: {}",
                        constraints
                            .violations
                            .iter()
                            .take(QUOTED_VIOLATIONS)
                            .cloned()
                            .collect::<Vec<_>>()
                            .join("; ")
                    ),
                    requires_approval: false,
                }),
            ),
            (
                "risk_critical",
                (risk.overall_risk == Severity::Critical).then(|| Verdict {
                    decision: Decision::Reject,
                    reason: format!("risk level too high: {}", risk.overall_risk),
                    requires_approval: false,
                }),
            ),
            (
                "risk_high",
                (risk.overall_risk == Severity::High).then(|| Verdict {
                    decision: Decision::RequestApproval,
                    reason: format!("high-risk action requires approval: {}", risk.overall_risk),
                    requires_approval: true,
                }),
            ),
            (
                "soft_constraints",
                (constraints.soft_constraints_score < self.constraint_threshold).then(|| {
                    Verdict {
                        decision: Decision::RequestApproval,
                        reason: format!(
                            "soft constraint score too low: {:.2}",
                            constraints.soft_constraints_score
                        ),
                        requires_approval: true,
                    }
                }),
            ),
            (
                "alignment_confidence",
                (score < HIGH_CONFIDENCE_ALIGNMENT).then(|| Verdict {
                    decision: Decision::Approve,
                    reason: format!("approved (alignment score: {:.2})", score),
                    requires_approval: false,
                }),
            ),
        ];

        for (check, verdict) in rules {
            match verdict {
                Some(verdict) => {
                    steps.push(EvaluationStep {
                        check: check.to_string(),
                        outcome: format!("matched: {}", verdict.reason),
                        terminal: true,
                    });
                    return (verdict, steps);
                }
                None => steps.push(EvaluationStep {
                    check: check.to_string(),
                    outcome: "passed".to_string(),
                    terminal: false,
                }),
            }
        }

        steps.push(EvaluationStep {
            check: "default".to_string(),
            outcome: "matched: approved".to_string(),
            terminal: true,
        });
        (
            Verdict {
                decision: Decision::Approve,
                reason: "approved".to_string(),
                requires_approval: false,
            },
            steps,
        )
    }

    /// Update both the coordinator's and the alignment evaluator's threshold.
    pub fn set_alignment_threshold(&mut self, threshold: f64) {
        self.alignment_threshold = threshold;
        self.alignment_engine.set_threshold(threshold);
    }

    pub fn set_constraint_threshold(&mut self, threshold: f64) {
        self.constraint_threshold = threshold;
    }

    /// Store the advisory risk threshold. The risk assessor's own severity
    /// thresholds are NOT changed, so decisions are unaffected.
    pub fn set_risk_threshold(&mut self, threshold: Severity) {
        self.risk_threshold = threshold;
    }

    pub fn alignment_threshold(&self) -> f64 {
        self.alignment_threshold
    }

    pub fn constraint_threshold(&self) -> f64 {
        self.constraint_threshold
    }

    pub fn risk_threshold(&self) -> Severity {
        self.risk_threshold
    }

    pub fn alignment_engine(&self) -> &AlignmentEvaluator {
        &self.alignment_engine
    }

    pub fn alignment_engine_mut(&mut self) -> &mut AlignmentEvaluator {
        &mut self.alignment_engine
    }

    pub fn constraint_engine(&self) -> &ConstraintChecker {
        &self.constraint_engine
    }

    pub fn constraint_engine_mut(&mut self) -> &mut ConstraintChecker {
        &mut self.constraint_engine
    }

    pub fn risk_engine(&self) -> &RiskAssessor {
        &self.risk_engine
    }

    pub fn risk_engine_mut(&mut self) -> &mut RiskAssessor {
        &mut self.risk_engine
    }
}

impl Default for SecurityDecisionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::model::RiskCategory;

    fn decide(coordinator: &SecurityDecisionCoordinator, text: &str) -> SecurityDecision {
        coordinator.make_decision(&StructuredIntent::new(text), None)
    }

    #[test]
    fn clean_intent_is_approved_plainly() {
        let decision = decide(&SecurityDecisionCoordinator::new(), "write unit tests");
        assert!(decision.is_approved());
        assert_eq!(decision.reason, "approved");
        assert!(!decision.requires_approval);
        assert_eq!(decision.approval_timeout_seconds, 300);
    }

    #[test]
    fn hard_violation_with_passing_alignment_rejects_on_rule_two() {
        // "forge" is not a value keyword, so alignment stays at 1.0.
        let decision = decide(&SecurityDecisionCoordinator::new(), "forge the invoice");
        assert!(decision.is_rejected());
        assert!(decision.reason.starts_with("hard constraint violation:"));
        assert!(decision.reason.contains("no_deception"));
    }

    #[test]
    fn lower_confidence_approval_below_point_nine() {
        let mut coordinator = SecurityDecisionCoordinator::new();
        coordinator.set_alignment_threshold(0.5);
        // "hide" and "false" both hit transparency: 0.4 × 0.8 weight.
        let decision = decide(&coordinator, "hide false numbers");
        let expected = (1.0 + 0.9 + 0.85 + 0.4 * 0.8 + 0.85) / 4.4;
        assert!((decision.alignment.overall_score - expected).abs() < 1e-9);
        assert!(decision.is_approved());
        assert!(decision.reason.starts_with("approved (alignment score:"));
    }

    #[test]
    fn soft_score_below_threshold_requests_approval() {
        let decision = decide(
            &SecurityDecisionCoordinator::new(),
            "slow delay leaves users unsatisfied and they complain",
        );
        assert_eq!(decision.decision, Decision::RequestApproval);
        assert!(decision.requires_approval);
        assert!(decision.reason.contains("soft constraint score too low: 0.33"));
    }

    #[test]
    fn high_risk_requests_approval() {
        let mut coordinator = SecurityDecisionCoordinator::new();
        *coordinator.risk_engine_mut() = RiskAssessor::with_thresholds(0.005, 0.5);
        let decision = decide(&coordinator, "review the security vulnerability report");
        assert_eq!(decision.risk.overall_risk, Severity::High);
        assert_eq!(decision.decision, Decision::RequestApproval);
        assert!(decision.requires_approval);
    }

    #[test]
    fn critical_risk_rejects() {
        let mut coordinator = SecurityDecisionCoordinator::new();
        *coordinator.risk_engine_mut() = RiskAssessor::with_thresholds(0.001, 0.005);
        let decision = decide(&coordinator, "review the security vulnerability report");
        assert!(decision.is_rejected());
        assert_eq!(decision.reason, "risk level too high: critical");
    }

    #[test]
    fn trace_stops_at_first_terminal_rule() {
        let coordinator = SecurityDecisionCoordinator::new();
        let trace =
            coordinator.make_decision_with_trace(&StructuredIntent::new("forge papers"), None);
        let checks: Vec<&str> = trace.steps.iter().map(|s| s.check.as_str()).collect();
        assert_eq!(checks, vec!["alignment", "hard_constraints"]);
        assert!(trace.steps.last().unwrap().terminal);
        assert!(trace.steps.iter().rev().skip(1).all(|s| !s.terminal));

        let clean = coordinator.make_decision_with_trace(&StructuredIntent::new("ok"), None);
        assert_eq!(clean.steps.len(), 7);
        assert_eq!(clean.steps[6].check, "default");
    }

    #[test]
    fn action_uses_intent_id_when_present() {
        let coordinator = SecurityDecisionCoordinator::new();
        let action = Action::new("copy files").with_intent_id("intent-1");
        assert_eq!(
            coordinator.make_decision_for_action(&action, None).intent_id,
            "intent-1"
        );
        let bare = Action::new("copy files");
        assert_eq!(
            coordinator.make_decision_for_action(&bare, None).intent_id,
            bare.id
        );
    }

    #[test]
    fn override_never_touches_escalated_decisions() {
        let coordinator = SecurityDecisionCoordinator::new();
        let action = Action::new("slow delay leaves users unsatisfied and they complain")
            .requiring_approval();
        let decision = coordinator.make_decision_for_action(&action, None);
        assert_eq!(decision.decision, Decision::RequestApproval);
        assert!(decision.reason.starts_with("soft constraint score too low"));
    }

    #[test]
    fn quick_check_returns_tag_only() {
        let coordinator = SecurityDecisionCoordinator::new();
        assert_eq!(coordinator.quick_check("read docs"), Decision::Approve);
        assert_eq!(coordinator.quick_check("crack the vault"), Decision::Reject);
    }

    #[test]
    fn custom_constraint_changes_decisions() {
        let mut coordinator = SecurityDecisionCoordinator::new();
        coordinator
            .constraint_engine_mut()
            .add_custom_constraint(Constraint::hard("c_1", "no_prod", &["production"]));
        assert_eq!(coordinator.quick_check("deploy to production"), Decision::Reject);
    }

    #[test]
    fn from_config_applies_overrides() {
        let mut config = PolicyConfig::default();
        config.removed_constraints.push("hc_002".to_string());
        config.thresholds.risk_high = 0.005;
        config.category_weights.insert(RiskCategory::SecurityBreach, 0.9);
        let coordinator = SecurityDecisionCoordinator::from_config(&config).unwrap();
        assert_eq!(coordinator.constraint_engine().hard_constraints().len(), 3);
        assert_eq!(coordinator.quick_check("forge the invoice"), Decision::Approve);
        assert_eq!(coordinator.risk_engine().high_threshold(), 0.005);
    }

    #[test]
    fn from_config_rejects_invalid_thresholds() {
        let mut config = PolicyConfig::default();
        config.thresholds.alignment = 1.5;
        assert!(matches!(
            SecurityDecisionCoordinator::from_config(&config),
            Err(PolicyError::InvalidThreshold { .. })
        ));
    }
}
