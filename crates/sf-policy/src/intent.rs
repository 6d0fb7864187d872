// intent.rs — Intent and action records, plus a keyword-level intent parser.
//
// Intents and actions are produced upstream and handed to the coordinator.
// The parser here is deliberately shallow: it trims the input, splits it
// into sentence goals, and flags ambiguous or risky wording by substring
// match. A parse that cannot be trusted is represented as a fallback
// intent (`StructuredIntent::fallback`), never as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Severity;

/// Words that make an instruction ambiguous.
const AMBIGUOUS_WORDS: &[&str] = &["可能", "也许", "大概", "maybe", "might", "possibly"];

/// Words that make an instruction worth flagging before evaluation.
const RISK_FLAG_KEYWORDS: &[&str] = &[
    "删除",
    "delete",
    "remove",
    "修改",
    "modify",
    "change",
    "权限",
    "permission",
    "access",
    "密码",
    "password",
    "secret",
    "绕过",
    "bypass",
    "skip",
];

/// A goal extracted from an instruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub constraints: Vec<String>,
}

fn default_priority() -> i64 {
    1
}

/// A detected ambiguity with its candidate readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ambiguity {
    pub description: String,
    #[serde(default)]
    pub possible_interpretations: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// A parsed user instruction, the coordinator's primary input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredIntent {
    pub id: String,
    #[serde(default)]
    pub raw_input: String,
    /// The resolved description every evaluation lens reads.
    #[serde(default)]
    pub parsed_intent: String,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub ambiguities: Vec<Ambiguity>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl StructuredIntent {
    /// A minimal intent carrying only a description and a fresh id.
    pub fn new(parsed_intent: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            raw_input: String::new(),
            parsed_intent: parsed_intent.into(),
            goals: Vec::new(),
            ambiguities: Vec::new(),
            confidence: 0.0,
            risk_flags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The intent an upstream parser hands over when it could not parse
    /// `raw_input`: empty description, goals, ambiguities and risk flags.
    pub fn fallback(raw_input: impl Into<String>) -> Self {
        Self {
            raw_input: raw_input.into(),
            ..Self::new("")
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A concrete action an agent proposes to execute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub id: String,
    #[serde(default)]
    pub intent_id: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// Declared risk level; HIGH and CRITICAL amplify risk probabilities.
    #[serde(default)]
    pub risk_level: Severity,
    #[serde(default)]
    pub requires_human_approval: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Action {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            intent_id: String::new(),
            action_type: String::new(),
            description: description.into(),
            parameters: serde_json::Map::new(),
            risk_level: Severity::Low,
            requires_human_approval: false,
            created_at: Utc::now(),
        }
    }

    /// Adapt an intent into an action: same id lineage, same description.
    pub fn for_intent(intent: &StructuredIntent) -> Self {
        Self {
            id: intent.id.clone(),
            intent_id: intent.id.clone(),
            ..Self::new(intent.parsed_intent.clone())
        }
    }

    pub fn with_intent_id(mut self, intent_id: impl Into<String>) -> Self {
        self.intent_id = intent_id.into();
        self
    }

    pub fn with_risk_level(mut self, risk_level: Severity) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn requiring_approval(mut self) -> Self {
        self.requires_human_approval = true;
        self
    }
}

/// Keyword-level parser turning free text into a `StructuredIntent`.
#[derive(Debug, Clone, Default)]
pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, input: &str) -> StructuredIntent {
        let intent = StructuredIntent {
            raw_input: input.to_string(),
            parsed_intent: input.trim().to_string(),
            goals: extract_goals(input),
            ambiguities: detect_ambiguities(input),
            confidence: calculate_confidence(input),
            risk_flags: detect_risk_flags(input),
            ..StructuredIntent::new("")
        };
        tracing::debug!(
            "parsed intent {}: {} goal(s), {} ambiguity(ies), {} risk flag(s)",
            intent.id,
            intent.goals.len(),
            intent.ambiguities.len(),
            intent.risk_flags.len()
        );
        intent
    }
}

/// Every non-empty `.`-separated sentence becomes a goal; earlier sentences
/// rank higher. Empty segments still count toward the ranking.
fn extract_goals(input: &str) -> Vec<Goal> {
    let segments: Vec<&str> = input.split('.').collect();
    let total = segments.len() as i64;
    segments
        .iter()
        .enumerate()
        .filter_map(|(i, sentence)| {
            let sentence = sentence.trim();
            (!sentence.is_empty()).then(|| Goal {
                description: sentence.to_string(),
                priority: total - i as i64,
                constraints: Vec::new(),
            })
        })
        .collect()
}

fn detect_ambiguities(input: &str) -> Vec<Ambiguity> {
    let lower = input.to_lowercase();
    AMBIGUOUS_WORDS
        .iter()
        .filter(|word| lower.contains(&word.to_lowercase()))
        .map(|word| Ambiguity {
            description: format!("ambiguous wording detected: {}", word),
            possible_interpretations: vec!["needs clarification".to_string()],
            confidence: 0.7,
        })
        .collect()
}

fn calculate_confidence(input: &str) -> f64 {
    let mut confidence = 1.0;
    if input.chars().count() < 10 {
        confidence *= 0.8;
    }
    let ambiguous = detect_ambiguities(input).len() as f64;
    confidence *= f64::max(0.5, 1.0 - ambiguous * 0.1);
    confidence.clamp(0.0, 1.0)
}

fn detect_risk_flags(input: &str) -> Vec<String> {
    let lower = input.to_lowercase();
    RISK_FLAG_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| format!("risk keyword detected: {}", keyword))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_splits_goals() {
        let intent = IntentParser::new().parse("  Read the report. Summarize it.  ");
        assert_eq!(intent.parsed_intent, "Read the report. Summarize it.");
        assert_eq!(intent.goals.len(), 2);
        assert_eq!(intent.goals[0].description, "Read the report");
        // Three segments (trailing empty one included) → priorities 3 and 2.
        assert_eq!(intent.goals[0].priority, 3);
        assert_eq!(intent.goals[1].priority, 2);
    }

    #[test]
    fn ambiguous_words_lower_confidence() {
        let parser = IntentParser::new();
        let clear = parser.parse("Send the weekly summary to the team");
        let vague = parser.parse("Maybe send the summary, it might help");
        assert_eq!(clear.confidence, 1.0);
        assert_eq!(vague.ambiguities.len(), 2);
        assert!((vague.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn short_input_is_penalized() {
        let intent = IntentParser::new().parse("go");
        assert!((intent.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn risk_flags_detected_case_insensitively() {
        let intent = IntentParser::new().parse("DELETE the old Password file");
        assert!(intent.risk_flags.iter().any(|f| f.ends_with("delete")));
        assert!(intent.risk_flags.iter().any(|f| f.ends_with("password")));
    }

    #[test]
    fn fallback_intent_is_empty_but_keeps_raw_input() {
        let intent = StructuredIntent::fallback("\u{0}garbled");
        assert_eq!(intent.raw_input, "\u{0}garbled");
        assert!(intent.parsed_intent.is_empty());
        assert!(intent.goals.is_empty());
        assert!(intent.ambiguities.is_empty());
        assert!(intent.risk_flags.is_empty());
    }

    #[test]
    fn action_for_intent_shares_id_and_description() {
        let intent = StructuredIntent::new("archive logs").with_id("intent-7");
        let action = Action::for_intent(&intent);
        assert_eq!(action.id, "intent-7");
        assert_eq!(action.intent_id, "intent-7");
        assert_eq!(action.description, "archive logs");
        assert_eq!(action.risk_level, Severity::Low);
    }

    #[test]
    fn action_json_defaults() {
        let action: Action = serde_json::from_str(r#"{"id": "a-1", "description": "x"}"#).unwrap();
        assert!(!action.requires_human_approval);
        assert_eq!(action.risk_level, Severity::Low);
        assert!(action.parameters.is_empty());
    }
}
