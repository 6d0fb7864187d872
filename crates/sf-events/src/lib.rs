//! # sf-events
//!
//! Safety events for collaborators that consume SafeFrame decisions.
//!
//! [`SafetyEvent::from_decision`] turns one decision record into the events
//! an approval workflow, an alerting channel or an operator log care about.
//! An [`EventDispatcher`] delivers them to every registered
//! [`DecisionObserver`]; a failing observer is logged and skipped.

pub mod error;
pub mod events;

pub use error::EventError;
pub use events::{DecisionObserver, EventDispatcher, LogSink, SafetyEvent};
