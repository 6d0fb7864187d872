//! # sf-policy
//!
//! Decision policy for SafeFrame agents.
//!
//! A [`SecurityDecisionCoordinator`] looks at a proposed action through three
//! independent lenses: alignment with a weighted [`ValueGraph`], compliance
//! with hard and soft [`Constraint`]s, and a seven-category risk profile from
//! the [`RiskAssessor`]. It folds them into one [`SecurityDecision`] via an
//! ordered veto chain. A separate [`RiskMatrix`] maps raw probability/impact
//! pairs to a severity and a mitigation strategy.
//!
//! ## Key invariants
//!
//! - **First rule wins**: an alignment failure is reported as such even when
//!   a hard constraint also failed.
//! - **Hard constraints veto**: any forbidden keyword rejects, regardless of
//!   alignment or risk.
//! - **Never fails on input**: zero weights score 0.0, keyword-free text
//!   scores as fully compliant and low risk, and fallback intents are
//!   evaluated like any other.
//! - **Escalation only**: an action that requires human approval can turn an
//!   APPROVE into REQUEST_APPROVAL, never the reverse.

pub mod alignment;
pub mod checker;
pub mod config;
pub mod constraint;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod intent;
pub mod matrix;
pub mod model;
pub mod risk;
pub mod values;

pub use alignment::{AlignmentAssessment, AlignmentEvaluator, AlignmentScore, EvaluationResult};
pub use checker::{CombinedCheckResult, ConstraintCheckResult, ConstraintChecker, ValidationResult};
pub use config::{PolicyConfig, ThresholdConfig};
pub use constraint::{Constraint, ConstraintConditions, ConstraintPriority, ConstraintType};
pub use context::{SecurityContext, SystemContext, UserContext};
pub use coordinator::{
    DecisionTrace, EvaluationStep, SecurityDecision, SecurityDecisionCoordinator,
    APPROVAL_OVERRIDE_REASON,
};
pub use error::PolicyError;
pub use intent::{Action, Ambiguity, Goal, IntentParser, StructuredIntent};
pub use matrix::{MitigationAction, MitigationStrategy, RiskMatrix, RiskMatrixEntry};
pub use model::{Decision, RiskCategory, RiskScore, Severity};
pub use risk::{RiskAssessment, RiskAssessor};
pub use values::{CoreValue, ValueCategory, ValueGraph, ValueRelation};
