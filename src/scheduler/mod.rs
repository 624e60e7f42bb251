//! Workflow scheduling - the DAG step scheduler and its production template.
//!
//! The orchestrator computes execution waves of mutually-independent,
//! dependency-satisfied steps and drives them to completion through the
//! message bus, tracking per-step state.

pub mod orchestrator;
pub mod template;

pub use orchestrator::{SchedulerConfig, WorkflowOrchestrator, ORCHESTRATOR_NAME};
