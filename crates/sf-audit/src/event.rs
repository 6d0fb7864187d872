// event.rs — One line of the decision audit log.
//
// A decision event embeds the full decision record (alignment, constraint
// and risk sub-assessments) as `metadata`, and the SHA-256 of the record's
// JSON as `output_hash`. `previous_hash` is filled in by the log on append.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sf_policy::coordinator::APPROVAL_OVERRIDE_REASON;
use sf_policy::{Decision, SecurityDecision};

use crate::error::AuditError;
use crate::hasher;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The coordinator produced a decision.
    Decision,
    /// An action's own approval flag escalated an APPROVE.
    ApprovalOverride,
    /// Evaluation could not be completed (e.g. bad configuration).
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub intent_id: String,
    pub action: AuditAction,
    /// None for `AuditAction::Error`.
    pub decision: Option<Decision>,
    #[serde(default)]
    pub reason: String,
    /// SHA-256 of the embedded record's JSON.
    pub output_hash: Option<String>,
    /// Hash of the preceding log line; None for the first event.
    pub previous_hash: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    pub fn new(intent_id: impl Into<String>, action: AuditAction) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            intent_id: intent_id.into(),
            action,
            decision: None,
            reason: String::new(),
            output_hash: None,
            previous_hash: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// An event carrying the full decision record.
    pub fn for_decision(decision: &SecurityDecision) -> Result<Self, AuditError> {
        let json = serde_json::to_string(decision)?;
        let action = if decision.reason == APPROVAL_OVERRIDE_REASON {
            AuditAction::ApprovalOverride
        } else {
            AuditAction::Decision
        };

        Ok(Self::new(decision.intent_id.clone(), action)
            .with_decision(decision.decision)
            .with_reason(decision.reason.clone())
            .with_output_hash(hasher::hash_str(&json))
            .with_metadata(serde_json::from_str(&json)?))
    }

    /// An event recording that no decision could be made.
    pub fn error(intent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(intent_id, AuditAction::Error).with_reason(message)
    }

    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_output_hash(mut self, hash: impl Into<String>) -> Self {
        self.output_hash = Some(hash.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// The embedded decision record, if this is a decision event.
    pub fn decision_record(&self) -> Option<SecurityDecision> {
        serde_json::from_value(self.metadata.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_policy::{Action, SecurityDecisionCoordinator, StructuredIntent};

    #[test]
    fn decision_event_embeds_full_record() {
        let coordinator = SecurityDecisionCoordinator::new();
        let decision =
            coordinator.make_decision(&StructuredIntent::new("forge a receipt").with_id("i-1"), None);
        let event = AuditEvent::for_decision(&decision).unwrap();

        assert_eq!(event.intent_id, "i-1");
        assert_eq!(event.action, AuditAction::Decision);
        assert_eq!(event.decision, Some(Decision::Reject));
        assert_eq!(event.output_hash.as_ref().map(String::len), Some(64));
        assert!(event.metadata["constraints"]["violations"].is_array());
        assert!(event.metadata["risk"]["risk_scores"].is_array());
        assert!(event.metadata["alignment"]["overall_score"].is_number());

        let record = event.decision_record().unwrap();
        assert_eq!(record.reason, decision.reason);
    }

    #[test]
    fn escalated_action_is_an_approval_override() {
        let coordinator = SecurityDecisionCoordinator::new();
        let action = Action::new("rotate the logs").requiring_approval();
        let decision = coordinator.make_decision_for_action(&action, None);
        let event = AuditEvent::for_decision(&decision).unwrap();
        assert_eq!(event.action, AuditAction::ApprovalOverride);
        assert_eq!(event.decision, Some(Decision::RequestApproval));
    }

    #[test]
    fn error_event_has_no_decision() {
        let event = AuditEvent::error("i-2", "invalid policy config");
        assert_eq!(event.action, AuditAction::Error);
        assert!(event.decision.is_none());
        assert!(event.decision_record().is_none());
    }

    #[test]
    fn actions_serialize_snake_case() {
        let json = serde_json::to_string(&AuditAction::ApprovalOverride).unwrap();
        assert_eq!(json, "\"approval_override\"");
    }
}
