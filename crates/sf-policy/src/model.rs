// model.rs — Shared vocabulary for the decision pipeline.
//
// Decisions, severities, the seven fixed risk categories, and the
// probability × impact score every risk component exchanges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The coordinator's final verdict on a proposed action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Proceed.
    Approve,
    /// Do not proceed.
    Reject,
    /// Hold until a human approves.
    RequestApproval,
    /// Postpone. Never produced by the built-in policy; reserved for hosts.
    Defer,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Reject => write!(f, "reject"),
            Decision::RequestApproval => write!(f, "request_approval"),
            Decision::Defer => write!(f, "defer"),
        }
    }
}

/// Four-level severity bucket.
///
/// Ordered so that `Severity::Low < Severity::Critical`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Bucket a probability × impact product with the fixed thresholds
    /// (critical ≥ 0.7, high ≥ 0.4, medium ≥ 0.2).
    pub fn from_combined(combined: f64) -> Self {
        if combined >= 0.7 {
            Severity::Critical
        } else if combined >= 0.4 {
            Severity::High
        } else if combined >= 0.2 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One of the seven harm classes scored independently by the risk assessor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    PhysicalHarm,
    PsychologicalHarm,
    FinancialHarm,
    PrivacyViolation,
    SecurityBreach,
    SocietalHarm,
    EnvironmentalHarm,
}

impl RiskCategory {
    /// All categories in assessment order.
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::PhysicalHarm,
        RiskCategory::PsychologicalHarm,
        RiskCategory::FinancialHarm,
        RiskCategory::PrivacyViolation,
        RiskCategory::SecurityBreach,
        RiskCategory::SocietalHarm,
        RiskCategory::EnvironmentalHarm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::PhysicalHarm => "physical_harm",
            RiskCategory::PsychologicalHarm => "psychological_harm",
            RiskCategory::FinancialHarm => "financial_harm",
            RiskCategory::PrivacyViolation => "privacy_violation",
            RiskCategory::SecurityBreach => "security_breach",
            RiskCategory::SocietalHarm => "societal_harm",
            RiskCategory::EnvironmentalHarm => "environmental_harm",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A probability/impact pair, optionally tied to a risk category.
///
/// Matrix lookups produce scores without a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskScore {
    pub probability: f64,
    pub impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RiskCategory>,
}

impl RiskScore {
    pub fn new(probability: f64, impact: f64, category: RiskCategory) -> Self {
        Self {
            probability,
            impact,
            category: Some(category),
        }
    }

    /// `probability × impact`.
    pub fn combined(&self) -> f64 {
        self.probability * self.impact
    }

    /// Severity of this single score using the fixed thresholds.
    pub fn level(&self) -> Severity {
        Severity::from_combined(self.combined())
    }
}
