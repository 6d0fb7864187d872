// project.rs — Per-project file layout for the CLI.
//
// Everything lives under `<project-root>/.sf/`:
//   policy.yaml    policy configuration (optional)
//   audit.jsonl    hash-chained decision log
//   events.jsonl   safety events from the log observer

use std::path::{Path, PathBuf};

use anyhow::Context;
use sf_audit::{AuditEvent, AuditLog};
use sf_policy::{PolicyConfig, SecurityDecisionCoordinator};

pub struct ProjectConfig {
    pub policy_path: PathBuf,
    pub audit_log: PathBuf,
    pub events_log: PathBuf,
}

impl ProjectConfig {
    pub fn for_project(project_root: &Path, policy_override: Option<&Path>) -> Self {
        let sf_dir = project_root.join(".sf");
        Self {
            policy_path: policy_override
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PolicyConfig::for_workspace(project_root)),
            audit_log: sf_dir.join("audit.jsonl"),
            events_log: sf_dir.join("events.jsonl"),
        }
    }

    pub fn load_policy(&self) -> anyhow::Result<PolicyConfig> {
        PolicyConfig::load_or_default(&self.policy_path)
            .with_context(|| format!("loading policy from {}", self.policy_path.display()))
    }

    /// Build a coordinator from the project policy. When the policy cannot
    /// be loaded, an error event is written to the audit log (if `audit`)
    /// before the error is returned.
    pub fn coordinator(&self, audit: bool) -> anyhow::Result<SecurityDecisionCoordinator> {
        let built = self
            .load_policy()
            .and_then(|policy| Ok(SecurityDecisionCoordinator::from_config(&policy)?));

        if let Err(e) = &built {
            if audit {
                let mut event = AuditEvent::error("-", format!("{:#}", e));
                if let Err(log_err) =
                    AuditLog::open(&self.audit_log).and_then(|mut log| log.append(&mut event))
                {
                    tracing::warn!("could not audit configuration error: {}", log_err);
                }
            }
        }
        built
    }
}
