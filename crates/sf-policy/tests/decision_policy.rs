// decision_policy.rs — Cross-engine properties of the decision policy.
//
// Each test drives a full coordinator (alignment + constraints + risk) and
// checks an observable property of the resulting decision record:
//
//   - keyword-free text scores 1.0 alignment and approves
//   - scores stay within [0, 1]
//   - hard constraint violations veto independently of other lenses
//   - the veto chain reports the FIRST failing rule
//   - decisions are idempotent for a fixed configuration
//   - the action-level approval override only escalates APPROVE
//   - the advisory risk threshold never reaches the assessor

use sf_policy::{
    Action, Decision, IntentParser, MitigationAction, RiskMatrix, SecurityContext,
    SecurityDecisionCoordinator, Severity, StructuredIntent, SystemContext,
};

fn intent(text: &str) -> StructuredIntent {
    StructuredIntent::new(text)
}

#[test]
fn keyword_free_descriptions_align_fully() {
    let coordinator = SecurityDecisionCoordinator::new();
    for text in [
        "summarize the release notes",
        "rename the build target",
        "",
        "整理会议记录",
    ] {
        let decision = coordinator.make_decision(&intent(text), None);
        assert_eq!(decision.alignment.overall_score, 1.0, "text: {:?}", text);
        assert_eq!(decision.decision, Decision::Approve, "text: {:?}", text);
    }
}

#[test]
fn scores_stay_in_unit_interval() {
    let coordinator = SecurityDecisionCoordinator::new();
    for text in [
        "harm danger attack force manipulate deceive leak steal surveillance",
        "severe disaster: hack the security vulnerability and leak private data for money",
        "伤害 攻击 泄露 窃取 监控 歧视 偏见",
        "plain text",
    ] {
        let decision = coordinator.make_decision(&intent(text), None);
        assert!((0.0..=1.0).contains(&decision.alignment.overall_score));
        assert!((0.0..=1.0).contains(&decision.risk.combined_score));
    }
}

#[test]
fn harm_fails_no_harm_to_humans_regardless_of_other_lenses() {
    let mut coordinator = SecurityDecisionCoordinator::new();
    // Loosen alignment so only the constraint lens can veto.
    coordinator.set_alignment_threshold(0.0);

    let decision = coordinator.make_decision(&intent("harm"), None);
    assert!(!decision.constraints.overall_passed());
    assert!(!decision.constraints.hard_constraints_passed);
    assert!(decision
        .constraints
        .results
        .iter()
        .any(|r| r.constraint_name == "no_harm_to_humans" && !r.passed));
    assert!(decision.is_rejected());
    assert!(decision.reason.starts_with("hard constraint violation:"));
}

#[test]
fn localized_harm_keyword_is_a_violation() {
    let decision = SecurityDecisionCoordinator::new().make_decision(&intent("伤害用户"), None);
    assert!(!decision.constraints.hard_constraints_passed);
}

#[test]
fn risk_matrix_reference_points() {
    let matrix = RiskMatrix::new();
    assert_eq!(matrix.get_severity(0.05, 0.05), Severity::Low);

    assert_eq!(matrix.get_severity(0.8, 0.8), Severity::Critical);
    let block = matrix.get_mitigation(&matrix.get_score(0.8, 0.8));
    assert_eq!(block.action, MitigationAction::Block);

    assert_eq!(matrix.get_severity(0.4, 0.7), Severity::High);
    let restrict = matrix.get_mitigation(&matrix.get_score(0.4, 0.7));
    assert!(restrict.requires_approval);
}

#[test]
fn alignment_failure_wins_over_hard_constraint() {
    let coordinator = SecurityDecisionCoordinator::new();
    // Hits several values AND no_harm_to_humans / no_unauthorized_access.
    let text = "harm and attack the user, leak and steal their data, deceive and force them";
    let decision = coordinator.make_decision(&intent(text), None);

    assert!(decision.alignment.overall_score < 0.8);
    assert!(!decision.constraints.hard_constraints_passed);
    assert!(decision.is_rejected());
    assert!(decision.reason.starts_with("value alignment check failed"));
    assert!(!decision.reason.contains("hard constraint"));
}

#[test]
fn repeated_decisions_are_identical() {
    let coordinator = SecurityDecisionCoordinator::new();
    let subject = intent("slowly migrate the public data with a delay").with_id("fixed-id");

    let first = coordinator.make_decision(&subject, None);
    let second = coordinator.make_decision(&subject, None);

    assert_eq!(first.decision, second.decision);
    assert_eq!(first.reason, second.reason);
    assert_eq!(first.alignment.overall_score, second.alignment.overall_score);
    assert_eq!(first.constraints.results, second.constraints.results);
    assert_eq!(first.risk.risk_scores, second.risk.risk_scores);
    assert_eq!(first.risk.action_id, second.risk.action_id);
}

#[test]
fn approval_override_escalates_approve() {
    let coordinator = SecurityDecisionCoordinator::new();
    let action = Action::new("archive last month's logs").requiring_approval();

    let decision = coordinator.make_decision_for_action(&action, None);
    assert_eq!(decision.decision, Decision::RequestApproval);
    assert!(decision.requires_approval);
    assert_eq!(decision.reason, "action requires human approval");
}

#[test]
fn approval_override_never_downgrades_reject() {
    let coordinator = SecurityDecisionCoordinator::new();
    let action = Action::new("bypass the login check").requiring_approval();

    let decision = coordinator.make_decision_for_action(&action, None);
    assert_eq!(decision.decision, Decision::Reject);
    assert!(!decision.requires_approval);
}

#[test]
fn action_without_flag_is_not_overridden() {
    let coordinator = SecurityDecisionCoordinator::new();
    let decision = coordinator.make_decision_for_action(&Action::new("archive logs"), None);
    assert_eq!(decision.decision, Decision::Approve);
}

#[test]
fn action_risk_level_is_not_carried_into_the_decision() {
    // Only the description is evaluated; a CRITICAL declaration on a
    // harmless action does not change the outcome.
    let coordinator = SecurityDecisionCoordinator::new();
    let action = Action::new("archive logs").with_risk_level(Severity::Critical);
    let decision = coordinator.make_decision_for_action(&action, None);
    assert_eq!(decision.decision, Decision::Approve);
    assert_eq!(decision.risk.overall_risk, Severity::Low);
}

#[test]
fn set_risk_threshold_does_not_reach_the_assessor() {
    // Surprising but intended: the coordinator's risk threshold is advisory.
    let mut coordinator = SecurityDecisionCoordinator::new();
    let before = coordinator.quick_check("scan for a security vulnerability");

    coordinator.set_risk_threshold(Severity::Low);
    assert_eq!(coordinator.risk_threshold(), Severity::Low);
    assert_eq!(coordinator.risk_engine().high_threshold(), 0.4);
    assert_eq!(coordinator.risk_engine().critical_threshold(), 0.7);
    assert_eq!(coordinator.quick_check("scan for a security vulnerability"), before);
}

#[test]
fn set_alignment_threshold_reaches_the_evaluator() {
    let mut coordinator = SecurityDecisionCoordinator::new();
    coordinator.set_alignment_threshold(0.95);
    assert_eq!(coordinator.alignment_engine().threshold(), 0.95);
    // One transparency hit: weighted score ≈ 0.945 < 0.95.
    assert_eq!(coordinator.quick_check("hide the banner"), Decision::Reject);
}

#[test]
fn fallback_intent_is_evaluated_without_special_casing() {
    let coordinator = SecurityDecisionCoordinator::new();
    let fallback = StructuredIntent::fallback("\u{fffd}\u{fffd} unparseable");
    let decision = coordinator.make_decision(&fallback, None);
    assert_eq!(decision.decision, Decision::Approve);
    assert_eq!(decision.intent_id, fallback.id);
}

#[test]
fn security_context_is_accepted_but_ignored() {
    let coordinator = SecurityDecisionCoordinator::new();
    let context = SecurityContext {
        system: Some(SystemContext::new("edge-1")),
        ..Default::default()
    };
    let subject = intent("write release notes").with_id("ctx");
    let with = coordinator.make_decision(&subject, Some(&context));
    let without = coordinator.make_decision(&subject, None);
    assert_eq!(with.decision, without.decision);
    assert_eq!(with.reason, without.reason);
}

#[test]
fn parsed_intents_flow_through_the_coordinator() {
    let parser = IntentParser::new();
    let coordinator = SecurityDecisionCoordinator::new();

    let benign = parser.parse("  Draft the onboarding guide. Share it with the team.  ");
    assert_eq!(coordinator.make_decision(&benign, None).decision, Decision::Approve);

    let hostile = parser.parse("Crack the admin password and delete the audit trail");
    assert!(!hostile.risk_flags.is_empty());
    assert!(coordinator.make_decision(&hostile, None).is_rejected());
}
