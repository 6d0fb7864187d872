// action.rs — Decide on a proposed action, honouring its approval flag.

use clap::Args;
use sf_policy::{Action, Severity};

use crate::project::ProjectConfig;

#[derive(Args)]
pub struct ActionArgs {
    /// What the action does.
    #[arg(long)]
    pub description: String,
    /// Intent the action belongs to (defaults to the action's own id).
    #[arg(long)]
    pub intent_id: Option<String>,
    /// Declared risk level: low, medium, high or critical.
    #[arg(long, default_value = "low", value_parser = parse_severity)]
    pub risk_level: Severity,
    /// The action needs a human sign-off regardless of policy.
    #[arg(long)]
    pub requires_approval: bool,
    /// Print the full decision record as JSON.
    #[arg(long)]
    pub json: bool,
    /// Do not write to the audit or event logs.
    #[arg(long)]
    pub no_record: bool,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => Err(format!(
            "unknown risk level '{}' (expected low, medium, high or critical)",
            other
        )),
    }
}

pub fn execute(args: &ActionArgs, config: &ProjectConfig) -> anyhow::Result<()> {
    let coordinator = config.coordinator(!args.no_record)?;

    let mut action = Action::new(&args.description).with_risk_level(args.risk_level);
    if let Some(intent_id) = &args.intent_id {
        action = action.with_intent_id(intent_id);
    }
    if args.requires_approval {
        action = action.requiring_approval();
    }

    let decision = coordinator.make_decision_for_action(&action, None);
    if !args.no_record {
        super::record_decision(config, &decision)?;
    }
    super::print_decision(&decision, args.json)
}
