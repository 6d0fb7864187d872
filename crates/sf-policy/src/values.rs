// values.rs — Weighted catalog of declared values.
//
// Each value belongs to a category, and each category has a fixed set of
// violation keywords. Compliance of a free-text description with a value
// starts at 1.0 and loses 0.3 for every keyword found (case-insensitive
// substring, no stemming), clamped to [0, 1].
//
// Relations between values ("conflicts", "supports", ...) are stored for
// introspection only; neither scoring nor the decision policy reads them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Penalty subtracted per violation keyword hit.
const VIOLATION_PENALTY: f64 = 0.3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    Safety,
    Autonomy,
    Fairness,
    Transparency,
    Privacy,
}

impl ValueCategory {
    /// The fixed violation keywords for this category.
    pub fn violation_keywords(&self) -> &'static [&'static str] {
        match self {
            ValueCategory::Safety => &["伤害", "harm", "危险", "danger", "攻击", "attack"],
            ValueCategory::Autonomy => &["强迫", "force", "操控", "manipulate", "欺骗", "deceive"],
            ValueCategory::Fairness => &["歧视", "discriminate", "偏见", "bias", "不公平", "unfair"],
            ValueCategory::Transparency => &["隐瞒", "hide", "欺骗", "deceive", "虚假", "false"],
            ValueCategory::Privacy => &["泄露", "leak", "窃取", "steal", "监控", "surveillance"],
        }
    }
}

impl fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueCategory::Safety => "safety",
            ValueCategory::Autonomy => "autonomy",
            ValueCategory::Fairness => "fairness",
            ValueCategory::Transparency => "transparency",
            ValueCategory::Privacy => "privacy",
        };
        f.write_str(s)
    }
}

/// A named, weighted value the agent is expected to uphold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreValue {
    /// Unique key within a catalog.
    pub name: String,
    pub category: ValueCategory,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub description: String,
    /// Constraint tags this value motivates (informational).
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_weight() -> f64 {
    1.0
}

fn default_priority() -> u32 {
    1
}

impl CoreValue {
    pub fn new(name: impl Into<String>, category: ValueCategory, weight: f64) -> Self {
        Self {
            name: name.into(),
            category,
            weight,
            description: String::new(),
            constraints: Vec::new(),
            priority: default_priority(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Score how well `behavior` complies with this value, in [0, 1].
    ///
    /// Hits on distinct keywords compound; a keyword counts once however
    /// often it appears.
    pub fn evaluate_compliance(&self, behavior: &str) -> f64 {
        let behavior = behavior.to_lowercase();
        let score = self
            .category
            .violation_keywords()
            .iter()
            .filter(|keyword| behavior.contains(*keyword))
            .fold(1.0, |score, _| score - VIOLATION_PENALTY);
        f64::clamp(score, 0.0, 1.0)
    }
}

/// A directed relation between two values, e.g. `privacy conflicts transparency`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueRelation {
    pub source: String,
    pub target: String,
    pub relation_type: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// The baseline catalog every new graph is seeded with.
pub fn baseline_values() -> Vec<CoreValue> {
    vec![
        CoreValue {
            name: "human_safety".to_string(),
            category: ValueCategory::Safety,
            weight: 1.0,
            description: "human life and safety come first".to_string(),
            constraints: vec![
                "never_harm_humans".to_string(),
                "prioritize_life_safety".to_string(),
            ],
            priority: 1,
        },
        CoreValue {
            name: "human_autonomy".to_string(),
            category: ValueCategory::Autonomy,
            weight: 0.9,
            description: "respect human autonomy".to_string(),
            constraints: vec![
                "respect_user_choices".to_string(),
                "no_manipulation".to_string(),
            ],
            priority: 2,
        },
        CoreValue {
            name: "fairness".to_string(),
            category: ValueCategory::Fairness,
            weight: 0.85,
            description: "treat every individual fairly".to_string(),
            constraints: vec!["no_discrimination".to_string(), "equal_treatment".to_string()],
            priority: 3,
        },
        CoreValue {
            name: "transparency".to_string(),
            category: ValueCategory::Transparency,
            weight: 0.8,
            description: "behavior must be explainable".to_string(),
            constraints: vec![
                "explain_decisions".to_string(),
                "disclose_limitations".to_string(),
            ],
            priority: 4,
        },
        CoreValue {
            name: "privacy".to_string(),
            category: ValueCategory::Privacy,
            weight: 0.85,
            description: "protect personal privacy".to_string(),
            constraints: vec!["data_minimization".to_string(), "consent_required".to_string()],
            priority: 3,
        },
    ]
}

/// Mutable value catalog keyed by name, kept in insertion order.
#[derive(Debug, Clone)]
pub struct ValueGraph {
    values: Vec<CoreValue>,
    relations: Vec<ValueRelation>,
}

impl ValueGraph {
    /// A graph seeded with [`baseline_values`].
    pub fn new() -> Self {
        Self {
            values: baseline_values(),
            relations: Vec::new(),
        }
    }

    /// A graph with no values at all.
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Insert a value, overwriting (in place) any value with the same name.
    pub fn add_value(&mut self, value: CoreValue) {
        match self.values.iter_mut().find(|v| v.name == value.name) {
            Some(existing) => *existing = value,
            None => self.values.push(value),
        }
    }

    pub fn add_relation(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        relation_type: impl Into<String>,
        weight: f64,
    ) {
        self.relations.push(ValueRelation {
            source: source.into(),
            target: target.into(),
            relation_type: relation_type.into(),
            weight,
        });
    }

    pub fn get_value(&self, name: &str) -> Option<&CoreValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Snapshot of every value.
    pub fn get_all_values(&self) -> Vec<CoreValue> {
        self.values.clone()
    }

    pub fn values(&self) -> &[CoreValue] {
        &self.values
    }

    pub fn relations(&self) -> &[ValueRelation] {
        &self.relations
    }

    /// Pairs linked by a `conflicts` relation whose endpoints both exist.
    pub fn find_conflicts(&self) -> Vec<(&CoreValue, &CoreValue)> {
        self.relations
            .iter()
            .filter(|r| r.relation_type == "conflicts")
            .filter_map(|r| Some((self.get_value(&r.source)?, self.get_value(&r.target)?)))
            .collect()
    }

    /// Per-value compliance of `behavior`, keyed by value name.
    pub fn evaluate_alignment(&self, behavior: &str) -> BTreeMap<String, f64> {
        self.values
            .iter()
            .map(|v| (v.name.clone(), v.evaluate_compliance(behavior)))
            .collect()
    }
}

impl Default for ValueGraph {
    fn default() -> Self {
        Self::new()
    }
}
