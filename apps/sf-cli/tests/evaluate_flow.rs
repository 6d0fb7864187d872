// Integration test: project policy → decision → audit log → event log.
//
// Exercises the same path the `sf evaluate` and `sf action` commands take,
// using the library crates directly.

use sf_audit::{AuditAction, AuditLog};
use sf_events::{EventDispatcher, LogSink};
use sf_policy::{
    Action, Decision, IntentParser, PolicyConfig, SecurityDecisionCoordinator,
    APPROVAL_OVERRIDE_REASON,
};
use tempfile::TempDir;

const POLICY: &str = r#"
thresholds:
  alignment: 0.8
constraints:
  - id: c_001
    name: no_production_writes
    type: hard
    conditions:
      forbidden_keywords: ["prod db"]
"#;

#[test]
fn policy_decisions_are_audited_and_published() {
    let dir = TempDir::new().unwrap();
    let sf_dir = dir.path().join(".sf");
    std::fs::create_dir_all(&sf_dir).unwrap();

    let policy_path = PolicyConfig::for_workspace(dir.path());
    std::fs::write(&policy_path, POLICY).unwrap();
    let audit_path = sf_dir.join("audit.jsonl");
    let events_path = sf_dir.join("events.jsonl");

    // ── Build the coordinator from the project policy ──
    let policy = PolicyConfig::load_or_default(&policy_path).unwrap();
    let coordinator = SecurityDecisionCoordinator::from_config(&policy).unwrap();
    assert_eq!(coordinator.constraint_engine().custom_constraints().len(), 1);

    let mut log = AuditLog::open(&audit_path).unwrap();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_observer(Box::new(LogSink::new(&events_path)));

    // ── A benign instruction is approved ──
    let intent = IntentParser::new().parse("update the readme");
    let approved = coordinator.make_decision(&intent, None);
    assert_eq!(approved.decision, Decision::Approve);
    log.record(&approved).unwrap();
    assert_eq!(dispatcher.publish(&approved).len(), 1);

    // ── The project constraint rejects a production write ──
    let intent = IntentParser::new().parse("drop the prod db tables");
    let rejected = coordinator.make_decision(&intent, None);
    assert_eq!(rejected.decision, Decision::Reject);
    assert!(rejected.reason.starts_with("hard constraint violation"));
    assert!(rejected.reason.contains("no_production_writes"));
    log.record(&rejected).unwrap();
    dispatcher.publish(&rejected);

    // ── An action flagged for approval is escalated ──
    let action = Action::new("update the readme")
        .with_intent_id("intent-42")
        .requiring_approval();
    let escalated = coordinator.make_decision_for_action(&action, None);
    assert_eq!(escalated.decision, Decision::RequestApproval);
    assert_eq!(escalated.reason, APPROVAL_OVERRIDE_REASON);
    assert_eq!(escalated.intent_id, "intent-42");
    log.record(&escalated).unwrap();
    assert_eq!(dispatcher.publish(&escalated).len(), 2);

    // ── The audit trail is complete and intact ──
    assert!(AuditLog::verify_chain(&audit_path).unwrap());
    let events = AuditLog::read_all(&audit_path).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].action, AuditAction::Decision);
    assert_eq!(events[1].decision, Some(Decision::Reject));
    assert_eq!(events[2].action, AuditAction::ApprovalOverride);
    assert_eq!(events[2].intent_id, "intent-42");

    let record = events[1].decision_record().unwrap();
    assert_eq!(record.intent_id, rejected.intent_id);
    assert!(!record.constraints.hard_constraints_passed);

    // ── One event line per published event ──
    let event_lines = std::fs::read_to_string(&events_path).unwrap();
    assert_eq!(event_lines.lines().count(), 4);
    assert!(event_lines.contains("\"event_type\":\"approval_required\""));
}

#[test]
fn missing_policy_falls_back_to_baseline() {
    let dir = TempDir::new().unwrap();
    let policy = PolicyConfig::load_or_default(&PolicyConfig::for_workspace(dir.path())).unwrap();
    assert_eq!(policy, PolicyConfig::default());

    let coordinator = SecurityDecisionCoordinator::from_config(&policy).unwrap();
    assert_eq!(coordinator.quick_check("bypass the firewall"), Decision::Reject);
    assert_eq!(coordinator.quick_check("update the readme"), Decision::Approve);
}
