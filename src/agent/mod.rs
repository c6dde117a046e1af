//! Decision agent: turns an email into zero or more applied actions.

pub mod decision;
pub mod triage_agent;

pub use decision::{DecisionResult, ToolInvocation};
pub use triage_agent::{TriageAgent, TriageOutcome};
