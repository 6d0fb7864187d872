// matrix.rs — Risk-matrix lookup for a probability/impact pair.

use clap::Args;
use serde::Serialize;
use sf_policy::{MitigationStrategy, RiskMatrix, Severity};

#[derive(Args)]
pub struct MatrixArgs {
    /// Likelihood of harm, 0.0 to 1.0.
    pub probability: f64,
    /// Magnitude of harm, 0.0 to 1.0.
    pub impact: f64,
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct MatrixLookup<'a> {
    probability: f64,
    impact: f64,
    combined: f64,
    severity: Severity,
    mitigation: &'a MitigationStrategy,
}

pub fn execute(args: &MatrixArgs) -> anyhow::Result<()> {
    let matrix = RiskMatrix::new();
    let score = matrix.get_score(args.probability, args.impact);
    let lookup = MatrixLookup {
        probability: score.probability,
        impact: score.impact,
        combined: score.combined(),
        severity: matrix.get_severity(args.probability, args.impact),
        mitigation: matrix.get_mitigation(&score),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lookup)?);
        return Ok(());
    }

    println!(
        "Probability {:.2} x impact {:.2} = {:.3}",
        lookup.probability, lookup.impact, lookup.combined
    );
    println!("Severity:    {}", lookup.severity);
    println!(
        "Mitigation:  {:?}: {}",
        lookup.mitigation.action, lookup.mitigation.description
    );
    if lookup.mitigation.requires_approval {
        println!(
            "Approval:    required (timeout {}s)",
            lookup.mitigation.approval_timeout_seconds
        );
    }
    Ok(())
}
