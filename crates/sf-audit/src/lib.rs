//! # sf-audit
//!
//! Tamper-evident audit trail for SafeFrame decisions.
//!
//! Every [`SecurityDecision`](sf_policy::SecurityDecision) handed to
//! [`AuditLog::record`] becomes one [`AuditEvent`] line in a JSONL file,
//! carrying the full nested record and its SHA-256. Events are chained by
//! `previous_hash`, and [`AuditLog::verify_chain`] reports the first broken
//! link.
//!
//! ```rust,no_run
//! use sf_audit::AuditLog;
//! use sf_policy::{SecurityDecisionCoordinator, StructuredIntent};
//!
//! let coordinator = SecurityDecisionCoordinator::new();
//! let decision = coordinator.make_decision(&StructuredIntent::new("tidy the repo"), None);
//! let mut log = AuditLog::open(".sf/audit.jsonl").unwrap();
//! log.record(&decision).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;

pub use error::AuditError;
pub use event::{AuditAction, AuditEvent};
pub use log::AuditLog;
