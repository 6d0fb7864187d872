// evaluate.rs — Parse a free-text instruction and decide on it.

use clap::Args;
use sf_policy::IntentParser;

use crate::project::ProjectConfig;

#[derive(Args)]
pub struct EvaluateArgs {
    /// The instruction to evaluate.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Print the full decision record as JSON.
    #[arg(long)]
    pub json: bool,
    /// Print each rule the coordinator evaluated.
    #[arg(long, conflicts_with = "json")]
    pub trace: bool,
    /// Do not write to the audit or event logs.
    #[arg(long)]
    pub no_record: bool,
}

pub fn execute(args: &EvaluateArgs, config: &ProjectConfig) -> anyhow::Result<()> {
    let coordinator = config.coordinator(!args.no_record)?;
    let intent = IntentParser::new().parse(&args.text.join(" "));

    let trace = coordinator.make_decision_with_trace(&intent, None);
    if !args.no_record {
        super::record_decision(config, &trace.decision)?;
    }

    super::print_decision(&trace.decision, args.json)?;
    if args.trace {
        super::print_trace(&trace.steps);
    }
    Ok(())
}
