// events.rs — Safety events derived from decisions, and their dispatch.
//
// Collaborators outside the policy core (approval workflow, alerting,
// operator logs) subscribe as observers. One decision yields:
//
//   - always a `decision_made` event
//   - an `approval_required` event when the record requires approval
//   - a `risk_alert` event when a REJECT or REQUEST_APPROVAL carries HIGH or
//     CRITICAL risk
//
// Dispatch is synchronous. An observer's error is logged and never stops
// the remaining observers or reaches the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sf_policy::{Decision, SecurityDecision, Severity};

use crate::error::EventError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SafetyEvent {
    /// The coordinator produced a decision.
    DecisionMade {
        intent_id: String,
        decision: Decision,
        reason: String,
        alignment_score: f64,
        overall_risk: Severity,
        timestamp: DateTime<Utc>,
    },

    /// A human must approve before the action may proceed.
    ApprovalRequired {
        intent_id: String,
        reason: String,
        approval_timeout_seconds: u64,
        timestamp: DateTime<Utc>,
    },

    /// A blocked or escalated action carried HIGH or CRITICAL risk.
    RiskAlert {
        intent_id: String,
        decision: Decision,
        overall_risk: Severity,
        mitigations: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl SafetyEvent {
    pub fn event_type(&self) -> &str {
        match self {
            SafetyEvent::DecisionMade { .. } => "decision_made",
            SafetyEvent::ApprovalRequired { .. } => "approval_required",
            SafetyEvent::RiskAlert { .. } => "risk_alert",
        }
    }

    pub fn intent_id(&self) -> &str {
        match self {
            SafetyEvent::DecisionMade { intent_id, .. }
            | SafetyEvent::ApprovalRequired { intent_id, .. }
            | SafetyEvent::RiskAlert { intent_id, .. } => intent_id,
        }
    }

    /// Every event one decision record gives rise to, in dispatch order.
    pub fn from_decision(record: &SecurityDecision) -> Vec<SafetyEvent> {
        let now = Utc::now();
        let mut events = vec![SafetyEvent::DecisionMade {
            intent_id: record.intent_id.clone(),
            decision: record.decision,
            reason: record.reason.clone(),
            alignment_score: record.alignment.overall_score,
            overall_risk: record.risk.overall_risk,
            timestamp: now,
        }];

        if record.requires_approval {
            events.push(SafetyEvent::ApprovalRequired {
                intent_id: record.intent_id.clone(),
                reason: record.reason.clone(),
                approval_timeout_seconds: record.approval_timeout_seconds,
                timestamp: now,
            });
        }

        let blocked = matches!(record.decision, Decision::Reject | Decision::RequestApproval);
        if blocked && record.risk.overall_risk >= Severity::High {
            events.push(SafetyEvent::RiskAlert {
                intent_id: record.intent_id.clone(),
                decision: record.decision,
                overall_risk: record.risk.overall_risk,
                mitigations: record.risk.mitigations.clone(),
                timestamp: now,
            });
        }

        events
    }
}

/// A collaborator that consumes safety events.
pub trait DecisionObserver: Send {
    /// Handle one event. Errors are logged by the dispatcher.
    fn send(&self, event: &SafetyEvent) -> Result<(), EventError>;
}

/// Appends events as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DecisionObserver for LogSink {
    fn send(&self, event: &SafetyEvent) -> Result<(), EventError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| EventError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| EventError::IoError {
                path: self.path.clone(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| EventError::IoError {
            path: self.path.clone(),
            source,
        })
    }
}

/// Fans events out to every registered observer.
pub struct EventDispatcher {
    observers: Vec<Box<dyn DecisionObserver>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn DecisionObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Send `event` to every observer. Returns how many failed.
    pub fn dispatch(&self, event: &SafetyEvent) -> usize {
        let mut failures = 0;
        for observer in &self.observers {
            if let Err(e) = observer.send(event) {
                tracing::warn!("decision observer error: {}", e);
                failures += 1;
            }
        }
        failures
    }

    /// Derive the events for `record` and dispatch each one.
    pub fn publish(&self, record: &SecurityDecision) -> Vec<SafetyEvent> {
        let events = SafetyEvent::from_decision(record);
        for event in &events {
            self.dispatch(event);
        }
        tracing::debug!(
            "published {} event(s) for intent {}",
            events.len(),
            record.intent_id
        );
        events
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
