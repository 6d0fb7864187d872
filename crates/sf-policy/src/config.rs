// config.rs — YAML policy configuration.
//
// Lives at `.sf/policy.yaml` under a project root. Every field defaults,
// so a missing file or an empty document yields the baseline policy.
//
// ```yaml
// thresholds:
//   alignment: 0.8
//   constraint: 0.6
//   risk: high
//   risk_high: 0.4
//   risk_critical: 0.7
// values:
//   - name: no_shortcuts
//     category: transparency
//     weight: 0.5
// constraints:
//   - id: c_001
//     name: no_production_writes
//     type: hard
//     conditions:
//       forbidden_keywords: ["prod db"]
// removed_constraints: [sc_001]
// category_weights:
//   financial_harm: 0.9
// risk_keywords:
//   security_breach: ["exfiltrate"]
// ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alignment::DEFAULT_ALIGNMENT_THRESHOLD;
use crate::constraint::Constraint;
use crate::coordinator::DEFAULT_CONSTRAINT_THRESHOLD;
use crate::error::PolicyError;
use crate::model::{RiskCategory, Severity};
use crate::risk::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_HIGH_THRESHOLD};
use crate::values::{CoreValue, ValueRelation};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    pub alignment: f64,
    pub constraint: f64,
    /// Advisory; stored on the coordinator only.
    pub risk: Severity,
    /// Risk assessor bucketing thresholds.
    pub risk_high: f64,
    pub risk_critical: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT_THRESHOLD,
            constraint: DEFAULT_CONSTRAINT_THRESHOLD,
            risk: Severity::High,
            risk_high: DEFAULT_HIGH_THRESHOLD,
            risk_critical: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    pub thresholds: ThresholdConfig,
    /// Extra values, upserted by name over the baseline catalog.
    pub values: Vec<CoreValue>,
    pub value_relations: Vec<ValueRelation>,
    /// Extra constraints, added as custom constraints.
    pub constraints: Vec<Constraint>,
    /// Constraint ids to remove after the extras are added.
    pub removed_constraints: Vec<String>,
    pub category_weights: BTreeMap<RiskCategory, f64>,
    pub risk_keywords: BTreeMap<RiskCategory, Vec<String>>,
}

impl PolicyConfig {
    /// Default config path for a project: `<root>/.sf/policy.yaml`.
    pub fn for_workspace(root: &Path) -> PathBuf {
        root.join(".sf").join("policy.yaml")
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let data = fs::read_to_string(path).map_err(|source| PolicyError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PolicyConfig = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the baseline config when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, PolicyError> {
        if !path.exists() {
            tracing::debug!("no policy config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| PolicyError::IoError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let yaml = serde_yaml::to_string(self).map_err(PolicyError::SerializeError)?;
        fs::write(path, yaml).map_err(|source| PolicyError::IoError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("alignment", t.alignment),
            ("constraint", t.constraint),
            ("risk_high", t.risk_high),
            ("risk_critical", t.risk_critical),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::InvalidThreshold {
                    name: name.to_string(),
                    value,
                });
            }
        }

        if let Some(value) = self.values.iter().find(|v| v.weight <= 0.0) {
            return Err(PolicyError::InvalidWeight {
                name: value.name.clone(),
                value: value.weight,
            });
        }

        if let Some((category, weight)) = self.category_weights.iter().find(|(_, w)| **w < 0.0) {
            return Err(PolicyError::InvalidWeight {
                name: category.to_string(),
                value: *weight,
            });
        }

        Ok(())
    }
}
