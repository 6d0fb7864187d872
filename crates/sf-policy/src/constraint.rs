// constraint.rs — Behavioral constraints and the baseline catalog.
//
// Hard and soft constraints share one record but are evaluated by different
// rules:
//
// - Hard: the first forbidden keyword found (case-insensitive substring)
//   fails the constraint. Any failure is an absolute veto.
// - Soft: the score starts at 1.0 and loses 0.2 per warning keyword found,
//   with no floor. The constraint passes iff `score >= weight`; the weight
//   is the constraint's own acceptance threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Penalty subtracted per soft-constraint warning keyword hit.
const WARNING_PENALTY: f64 = 0.2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Hard,
    Soft,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::Hard => write!(f, "hard"),
            ConstraintType::Soft => write!(f, "soft"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for ConstraintPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintPriority::Low => write!(f, "low"),
            ConstraintPriority::Medium => write!(f, "medium"),
            ConstraintPriority::High => write!(f, "high"),
            ConstraintPriority::Critical => write!(f, "critical"),
        }
    }
}

/// Keyword sets a constraint matches against.
///
/// Hard constraints read `forbidden_keywords`, soft ones `warning_keywords`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConstraintConditions {
    #[serde(default)]
    pub forbidden_keywords: Vec<String>,
    #[serde(default)]
    pub warning_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    /// Unique key within a checker.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,
    #[serde(default)]
    pub priority: ConstraintPriority,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub conditions: ConstraintConditions,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub adjustable: bool,
}

fn default_weight() -> f64 {
    1.0
}

/// Outcome of evaluating one constraint against a description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintOutcome {
    pub passed: bool,
    /// Empty when the constraint passed.
    pub reason: String,
    /// Hard: 1.0 or 0.0. Soft: the raw 1.0-minus-penalty score.
    pub score: f64,
}

impl Constraint {
    pub fn hard(id: impl Into<String>, name: impl Into<String>, forbidden: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            constraint_type: ConstraintType::Hard,
            priority: ConstraintPriority::Critical,
            scope: vec!["global".to_string()],
            conditions: ConstraintConditions {
                forbidden_keywords: forbidden.iter().map(|k| k.to_string()).collect(),
                warning_keywords: Vec::new(),
            },
            weight: default_weight(),
            adjustable: false,
        }
    }

    pub fn soft(
        id: impl Into<String>,
        name: impl Into<String>,
        weight: f64,
        warnings: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            constraint_type: ConstraintType::Soft,
            priority: ConstraintPriority::Medium,
            scope: vec!["global".to_string()],
            conditions: ConstraintConditions {
                forbidden_keywords: Vec::new(),
                warning_keywords: warnings.iter().map(|k| k.to_string()).collect(),
            },
            weight,
            adjustable: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: ConstraintPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_hard(&self) -> bool {
        self.constraint_type == ConstraintType::Hard
    }

    /// Evaluate `description` by the rule for this constraint's type.
    pub fn evaluate(&self, description: &str) -> ConstraintOutcome {
        let description = description.to_lowercase();
        match self.constraint_type {
            ConstraintType::Hard => self.evaluate_hard(&description),
            ConstraintType::Soft => self.evaluate_soft(&description),
        }
    }

    fn evaluate_hard(&self, description: &str) -> ConstraintOutcome {
        let hit = self
            .conditions
            .forbidden_keywords
            .iter()
            .find(|keyword| description.contains(&keyword.to_lowercase()));

        match hit {
            Some(keyword) => ConstraintOutcome {
                passed: false,
                reason: format!(
                    "hard constraint '{}' violated: forbidden keyword '{}' detected",
                    self.name, keyword
                ),
                score: 0.0,
            },
            None => ConstraintOutcome {
                passed: true,
                reason: String::new(),
                score: 1.0,
            },
        }
    }

    fn evaluate_soft(&self, description: &str) -> ConstraintOutcome {
        let score = self
            .conditions
            .warning_keywords
            .iter()
            .filter(|keyword| description.contains(&keyword.to_lowercase()))
            .fold(1.0, |score, _| score - WARNING_PENALTY);

        if score >= self.weight {
            ConstraintOutcome {
                passed: true,
                reason: String::new(),
                score,
            }
        } else {
            ConstraintOutcome {
                passed: false,
                reason: format!("soft constraint '{}' score: {:.2}", self.name, score),
                score,
            }
        }
    }
}

/// The four absolute rules every checker starts with.
pub fn baseline_hard_constraints() -> Vec<Constraint> {
    vec![
        Constraint::hard(
            "hc_001",
            "no_harm_to_humans",
            &["伤害", "harm", "攻击", "attack", "杀", "kill", "毒", "poison", "爆炸", "explode"],
        )
        .with_description("never cause physical or psychological harm to people"),
        Constraint::hard(
            "hc_002",
            "no_deception",
            &["欺骗", "deceive", "诈骗", "fraud", "伪造", "forge", "假冒", "impersonate"],
        )
        .with_description("never deceive or defraud the user"),
        Constraint::hard(
            "hc_003",
            "no_unauthorized_access",
            &[
                "绕过",
                "bypass",
                "破解",
                "crack",
                "越权",
                "unauthorized",
                "入侵",
                "intrude",
                "黑客",
                "hack",
            ],
        )
        .with_description("never access systems or data without authorization"),
        Constraint::hard(
            "hc_004",
            "no_self_modification_of_safety",
            &[
                "修改安全",
                "modify safety",
                "禁用安全",
                "disable safety",
                "绕过约束",
                "bypass constraint",
            ],
        )
        .with_description("never alter or disable its own safety mechanisms"),
    ]
}

/// The adjustable tolerances every checker starts with.
pub fn baseline_soft_constraints() -> Vec<Constraint> {
    vec![
        Constraint::soft("sc_001", "efficiency", 0.7, &["慢", "slow", "延迟", "delay"])
            .with_description("complete tasks efficiently"),
        Constraint::soft(
            "sc_002",
            "user_satisfaction",
            0.8,
            &["不满意", "unsatisfied", "抱怨", "complain"],
        )
        .with_description("keep the user satisfied")
        .with_priority(ConstraintPriority::High),
        Constraint::soft(
            "sc_003",
            "resource_optimization",
            0.6,
            &["浪费", "waste", "过度使用", "excessive"],
        )
        .with_description("use resources economically"),
    ]
}
