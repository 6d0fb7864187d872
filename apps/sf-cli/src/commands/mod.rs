pub mod action;
pub mod audit;
pub mod catalog;
pub mod evaluate;
pub mod matrix;

use sf_audit::AuditLog;
use sf_events::{EventDispatcher, LogSink};
use sf_policy::{EvaluationStep, SecurityDecision};

use crate::project::ProjectConfig;

/// Append the decision to the audit log and publish its safety events to
/// the project's event log.
pub(crate) fn record_decision(
    config: &ProjectConfig,
    decision: &SecurityDecision,
) -> anyhow::Result<()> {
    let mut log = AuditLog::open(&config.audit_log)?;
    log.record(decision)?;

    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_observer(Box::new(LogSink::new(&config.events_log)));
    dispatcher.publish(decision);
    Ok(())
}

pub(crate) fn print_decision(decision: &SecurityDecision, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(decision)?);
        return Ok(());
    }

    println!("Intent:      {}", decision.intent_id);
    println!("Decision:    {}", decision.decision);
    println!("Reason:      {}", decision.reason);
    println!(
        "Alignment:   {:.2} (threshold {:.2})",
        decision.alignment.overall_score, decision.alignment.threshold
    );
    println!(
        "Constraints: hard {}, soft score {:.2}",
        if decision.constraints.hard_constraints_passed {
            "passed"
        } else {
            "FAILED"
        },
        decision.constraints.soft_constraints_score
    );
    for violation in &decision.constraints.violations {
        println!("  violation: {}", violation);
    }
    for warning in &decision.constraints.warnings {
        println!("  warning:   {}", warning);
    }
    println!(
        "Risk:        {} (combined {:.3})",
        decision.risk.overall_risk, decision.risk.combined_score
    );
    for mitigation in &decision.risk.mitigations {
        println!("  mitigation: {}", mitigation);
    }
    if decision.requires_approval {
        println!(
            "Approval:    required (timeout {}s)",
            decision.approval_timeout_seconds
        );
    }
    Ok(())
}

pub(crate) fn print_trace(steps: &[EvaluationStep]) {
    println!();
    println!("{:<22} {:<9} OUTCOME", "CHECK", "TERMINAL");
    println!("{}", "-".repeat(72));
    for step in steps {
        println!(
            "{:<22} {:<9} {}",
            step.check,
            if step.terminal { "yes" } else { "" },
            step.outcome
        );
    }
}
