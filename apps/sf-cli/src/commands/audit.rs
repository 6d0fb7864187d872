// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use clap::Subcommand;
use sf_audit::{AuditError, AuditLog};

use crate::project::ProjectConfig;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain.
    Verify {
        /// Path to audit log (defaults to .sf/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent decisions.
    Tail {
        /// Path to audit log (defaults to .sf/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &ProjectConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match AuditLog::verify_chain(&path) {
                Ok(_) => {
                    let events = AuditLog::read_all(&path)?;
                    println!(
                        "Audit log verified: {} event(s), hash chain intact.",
                        events.len()
                    );
                }
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("INTEGRITY VIOLATION at line {}:", line);
                    println!("  Expected previous_hash: {}", expected);
                    println!("  Actual previous_hash:   {}", actual);
                    anyhow::bail!("Audit log integrity check failed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let events = AuditLog::read_all(&path)?;
            let recent = &events[events.len().saturating_sub(*n)..];
            if recent.is_empty() {
                println!("No audit events.");
                return Ok(());
            }

            println!(
                "{:<20} {:<38} {:<17} {:<17} REASON",
                "TIMESTAMP", "INTENT", "ACTION", "DECISION"
            );
            println!("{}", "-".repeat(100));
            for event in recent {
                println!(
                    "{:<20} {:<38} {:<17} {:<17} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.intent_id,
                    format!("{:?}", event.action),
                    event
                        .decision
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    event.reason,
                );
            }
        }
    }

    Ok(())
}
