// risk.rs — Per-category risk assessor.
//
// For each of the seven categories:
//   probability = min(1, 0.15 × keyword hits), × 1.3 for a HIGH action and
//                 × 1.5 for a CRITICAL one, clamped to 1
//   impact      = 0.3 × category weight, × 1.5 when a high-impact word is
//                 present, clamped to 1
// The combined score is the category-weighted mean of probability × impact.
// It is bucketed by the assessor's own high/critical thresholds, which are
// independent of the risk matrix and of the coordinator's risk threshold.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::{Action, StructuredIntent};
use crate::model::{RiskCategory, RiskScore, Severity};

pub const DEFAULT_HIGH_THRESHOLD: f64 = 0.4;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.7;

/// Weight used for a category with no configured weight.
const FALLBACK_CATEGORY_WEIGHT: f64 = 0.5;
const PROBABILITY_PER_HIT: f64 = 0.15;
const BASE_IMPACT: f64 = 0.3;
const MITIGATION_FLOOR: f64 = 0.3;

const HIGH_IMPACT_KEYWORDS: &[&str] = &["严重", "severe", "重大", "major", "灾难", "disaster"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub action_id: String,
    pub overall_risk: Severity,
    /// One score per category, in `RiskCategory::ALL` order.
    pub risk_scores: Vec<RiskScore>,
    pub combined_score: f64,
    #[serde(default)]
    pub mitigations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// LOW and MEDIUM are acceptable without escalation.
    pub fn is_acceptable(&self) -> bool {
        matches!(self.overall_risk, Severity::Low | Severity::Medium)
    }
}

#[derive(Debug, Clone)]
pub struct RiskAssessor {
    high_threshold: f64,
    critical_threshold: f64,
    category_weights: BTreeMap<RiskCategory, f64>,
    risk_keywords: BTreeMap<RiskCategory, Vec<String>>,
}

impl RiskAssessor {
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_HIGH_THRESHOLD, DEFAULT_CRITICAL_THRESHOLD)
    }

    pub fn with_thresholds(high_threshold: f64, critical_threshold: f64) -> Self {
        Self {
            high_threshold,
            critical_threshold,
            category_weights: default_category_weights(),
            risk_keywords: default_risk_keywords(),
        }
    }

    pub fn assess(&self, action: &Action) -> RiskAssessment {
        let risk_scores: Vec<RiskScore> = RiskCategory::ALL
            .iter()
            .map(|&category| {
                RiskScore::new(
                    self.calculate_probability(action, category),
                    self.calculate_impact(action, category),
                    category,
                )
            })
            .collect();

        let combined_score = self.combined_score(&risk_scores);
        let overall_risk = self.severity_for(combined_score);
        let mitigations = risk_scores
            .iter()
            .filter(|s| s.combined() >= MITIGATION_FLOOR)
            .filter_map(|s| s.category)
            .map(|category| format!("apply mitigation for '{}' risk", category))
            .collect();

        tracing::debug!(
            "risk assessment for action {}: combined {:.3} → {}",
            action.id,
            combined_score,
            overall_risk
        );

        RiskAssessment {
            action_id: action.id.clone(),
            overall_risk,
            risk_scores,
            combined_score,
            mitigations,
            created_at: Utc::now(),
        }
    }

    /// Assess an intent as an action with the intent's id and description.
    /// Intents carry no declared risk level, so no amplification applies.
    pub fn assess_intent(&self, intent: &StructuredIntent) -> RiskAssessment {
        self.assess(&Action::for_intent(intent))
    }

    pub fn calculate_probability(&self, action: &Action, category: RiskCategory) -> f64 {
        let description = action.description.to_lowercase();
        let hits = self
            .risk_keywords
            .get(&category)
            .map(|keywords| {
                keywords
                    .iter()
                    .filter(|k| description.contains(&k.to_lowercase()))
                    .count()
            })
            .unwrap_or(0);

        let mut probability = f64::min(1.0, hits as f64 * PROBABILITY_PER_HIT);
        match action.risk_level {
            Severity::High => probability *= 1.3,
            Severity::Critical => probability *= 1.5,
            Severity::Low | Severity::Medium => {}
        }
        f64::min(1.0, probability)
    }

    pub fn calculate_impact(&self, action: &Action, category: RiskCategory) -> f64 {
        let description = action.description.to_lowercase();
        let mut impact = BASE_IMPACT * self.category_weight(category);
        if HIGH_IMPACT_KEYWORDS.iter().any(|k| description.contains(k)) {
            impact *= 1.5;
        }
        f64::min(1.0, impact)
    }

    fn combined_score(&self, scores: &[RiskScore]) -> f64 {
        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;
        for score in scores {
            let weight = score
                .category
                .map(|c| self.category_weight(c))
                .unwrap_or(FALLBACK_CATEGORY_WEIGHT);
            total_weighted += score.combined() * weight;
            total_weight += weight;
        }
        if total_weight > 0.0 {
            total_weighted / total_weight
        } else {
            0.0
        }
    }

    fn severity_for(&self, combined: f64) -> Severity {
        if combined >= self.critical_threshold {
            Severity::Critical
        } else if combined >= self.high_threshold {
            Severity::High
        } else if combined >= 0.2 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn set_category_weight(&mut self, category: RiskCategory, weight: f64) {
        self.category_weights.insert(category, weight);
    }

    pub fn category_weight(&self, category: RiskCategory) -> f64 {
        self.category_weights
            .get(&category)
            .copied()
            .unwrap_or(FALLBACK_CATEGORY_WEIGHT)
    }

    pub fn add_risk_keywords<I, S>(&mut self, category: RiskCategory, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.risk_keywords
            .entry(category)
            .or_default()
            .extend(keywords.into_iter().map(Into::into));
    }

    pub fn risk_keywords(&self, category: RiskCategory) -> &[String] {
        self.risk_keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn high_threshold(&self) -> f64 {
        self.high_threshold
    }

    pub fn critical_threshold(&self) -> f64 {
        self.critical_threshold
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

fn default_category_weights() -> BTreeMap<RiskCategory, f64> {
    BTreeMap::from([
        (RiskCategory::PhysicalHarm, 1.0),
        (RiskCategory::PsychologicalHarm, 0.8),
        (RiskCategory::FinancialHarm, 0.7),
        (RiskCategory::PrivacyViolation, 0.85),
        (RiskCategory::SecurityBreach, 0.9),
        (RiskCategory::SocietalHarm, 0.75),
        (RiskCategory::EnvironmentalHarm, 0.6),
    ])
}

fn default_risk_keywords() -> BTreeMap<RiskCategory, Vec<String>> {
    let table: [(RiskCategory, &[&str]); 7] = [
        (
            RiskCategory::PhysicalHarm,
            &["伤害", "harm", "攻击", "attack", "暴力", "violence", "武器", "weapon", "危险", "danger"],
        ),
        (
            RiskCategory::PsychologicalHarm,
            &[
                "恐吓",
                "intimidate",
                "骚扰",
                "harass",
                "欺凌",
                "bully",
                "精神",
                "mental",
                "心理",
                "psychological",
            ],
        ),
        (
            RiskCategory::FinancialHarm,
            &["欺诈", "fraud", "盗窃", "theft", "财务", "financial", "金钱", "money", "损失", "loss"],
        ),
        (
            RiskCategory::PrivacyViolation,
            &[
                "隐私",
                "privacy",
                "泄露",
                "leak",
                "数据",
                "data",
                "监控",
                "surveillance",
                "窃取",
                "steal",
            ],
        ),
        (
            RiskCategory::SecurityBreach,
            &[
                "入侵",
                "intrusion",
                "漏洞",
                "vulnerability",
                "黑客",
                "hack",
                "安全",
                "security",
                "攻击",
                "attack",
            ],
        ),
        (
            RiskCategory::SocietalHarm,
            &[
                "社会",
                "societal",
                "公众",
                "public",
                "群体",
                "group",
                "歧视",
                "discrimination",
                "偏见",
                "bias",
            ],
        ),
        (
            RiskCategory::EnvironmentalHarm,
            &[
                "环境",
                "environment",
                "污染",
                "pollution",
                "生态",
                "ecology",
                "破坏",
                "destroy",
                "浪费",
                "waste",
            ],
        ),
    ];
    table
        .into_iter()
        .map(|(category, keywords)| {
            (
                category,
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_free_action_is_low_risk() {
        let assessment = RiskAssessor::new().assess(&Action::new("rename a variable"));
        assert_eq!(assessment.overall_risk, Severity::Low);
        assert_eq!(assessment.combined_score, 0.0);
        assert_eq!(assessment.risk_scores.len(), 7);
        assert!(assessment.mitigations.is_empty());
        assert!(assessment.is_acceptable());
    }

    #[test]
    fn probability_counts_hits_and_amplifies_by_risk_level() {
        let assessor = RiskAssessor::new();
        let action = Action::new("hack the security layer");
        let p = assessor.calculate_probability(&action, RiskCategory::SecurityBreach);
        assert!((p - 0.3).abs() < 1e-9);

        let high = action.clone().with_risk_level(Severity::High);
        let p = assessor.calculate_probability(&high, RiskCategory::SecurityBreach);
        assert!((p - 0.39).abs() < 1e-9);

        let critical = action.with_risk_level(Severity::Critical);
        let p = assessor.calculate_probability(&critical, RiskCategory::SecurityBreach);
        assert!((p - 0.45).abs() < 1e-9);
    }

    #[test]
    fn probability_is_clamped_to_one() {
        let assessor = RiskAssessor::new();
        let text = "harm attack violence weapon danger 伤害 攻击 暴力";
        let action = Action::new(text).with_risk_level(Severity::Critical);
        assert_eq!(
            assessor.calculate_probability(&action, RiskCategory::PhysicalHarm),
            1.0
        );
    }

    #[test]
    fn impact_scales_with_weight_and_high_impact_words() {
        let assessor = RiskAssessor::new();
        let calm = Action::new("move files");
        let severe = Action::new("a severe, major disaster");
        let base = assessor.calculate_impact(&calm, RiskCategory::PhysicalHarm);
        assert!((base - 0.3).abs() < 1e-9);
        // Applied once regardless of how many high-impact words appear.
        let boosted = assessor.calculate_impact(&severe, RiskCategory::PhysicalHarm);
        assert!((boosted - 0.45).abs() < 1e-9);
    }

    #[test]
    fn combined_score_stays_in_unit_interval() {
        let assessor = RiskAssessor::new();
        let text = "severe harm attack violence weapon danger hack leak data fraud theft";
        let action = Action::new(text).with_risk_level(Severity::Critical);
        let assessment = assessor.assess(&action);
        assert!((0.0..=1.0).contains(&assessment.combined_score));
        assert!(assessment.mitigations.iter().any(|m| m.contains("physical_harm")));
    }

    #[test]
    fn custom_thresholds_change_bucketing() {
        let assessor = RiskAssessor::with_thresholds(0.005, 0.01);
        let assessment = assessor.assess(&Action::new("hack the security layer"));
        assert_eq!(assessment.overall_risk, Severity::Critical);
        assert!(!assessment.is_acceptable());
    }

    #[test]
    fn added_keywords_raise_probability() {
        let mut assessor = RiskAssessor::new();
        let action = Action::new("drain the reservoir");
        assert_eq!(
            assessor.calculate_probability(&action, RiskCategory::EnvironmentalHarm),
            0.0
        );
        assessor.add_risk_keywords(RiskCategory::EnvironmentalHarm, ["drain"]);
        assert!(assessor.calculate_probability(&action, RiskCategory::EnvironmentalHarm) > 0.0);
    }

    #[test]
    fn zero_category_weights_score_zero() {
        let mut assessor = RiskAssessor::new();
        for category in RiskCategory::ALL {
            assessor.set_category_weight(category, 0.0);
        }
        let assessment = assessor.assess(&Action::new("harm"));
        assert_eq!(assessment.combined_score, 0.0);
    }

    #[test]
    fn assess_intent_uses_intent_id() {
        let intent = StructuredIntent::new("leak data").with_id("i-42");
        let assessment = RiskAssessor::new().assess_intent(&intent);
        assert_eq!(assessment.action_id, "i-42");
    }
}
