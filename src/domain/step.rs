//! Workflow step types
//!
//! A Step is one schedulable unit of work inside a workflow's dependency
//! graph. Steps are created with their workflow and mutated only by the
//! orchestrator driving them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a single workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting for dependencies to complete
    Pending,
    /// All dependencies completed; eligible for the next wave
    Ready,
    /// Dispatched to its worker, response outstanding
    Running,
    /// Worker produced a result
    Completed,
    /// Worker failed, timed out, or was unreachable
    Failed,
}

impl StepStatus {
    /// Returns true if the step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

/// A single step in a workflow's dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier within the owning workflow
    pub id: String,

    /// Logical worker name this step dispatches to
    pub worker: String,

    /// Opaque task payload sent to the worker
    pub task: Value,

    /// Step ids that must complete before this step can run
    pub dependencies: Vec<String>,

    /// Current status
    pub status: StepStatus,

    /// Worker result, present iff Completed
    pub result: Option<Value>,

    /// Error description, present iff Failed
    pub error: Option<String>,

    /// When the step was dispatched
    pub started_at: Option<DateTime<Utc>>,

    /// When the step settled
    pub completed_at: Option<DateTime<Utc>>,
}

impl Step {
    /// Create a new step with no dependencies
    pub fn new(id: impl Into<String>, worker: impl Into<String>, task: Value) -> Self {
        Self {
            id: id.into(),
            worker: worker.into(),
            task,
            dependencies: Vec::new(),
            status: StepStatus::Pending,
            result: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Set the step's dependencies
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = dependencies.into_iter().map(|d| d.into()).collect();
        self
    }

    /// Mark the step completed with its result
    pub fn complete(&mut self, result: Value) {
        self.status = StepStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
    }

    /// Mark the step failed with an error description
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}
