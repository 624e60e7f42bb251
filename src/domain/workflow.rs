//! Workflow record and status reporting
//!
//! A Workflow owns a DAG of steps plus the execution state the orchestrator
//! tracks while driving it. Graph validity (no duplicate ids, no self- or
//! unknown dependencies, no cycles) is enforced at construction so the drive
//! loop only ever has to deal with dependency failures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::step::{Step, StepStatus};
use crate::error::{ReelrError, Result};
use crate::id::generate_workflow_id;

/// Status of a workflow's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    /// Created, not yet executing
    Pending,
    /// Drive loop is dispatching waves
    Running,
    /// Dispatch suspended between waves (resumable)
    Paused,
    /// Every step completed
    Completed,
    /// At least one step failed or the graph got stuck
    Failed,
    /// Cancelled before completion
    Cancelled,
}

impl WorkflowStatus {
    /// Returns true if the workflow is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }
}

/// A DAG of steps plus execution state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier
    pub workflow_id: String,

    /// The topic this workflow produces content for
    pub topic: String,

    /// Current status
    pub status: WorkflowStatus,

    /// Steps keyed by step id
    pub steps: BTreeMap<String, Step>,

    /// Step results, populated incrementally as steps complete
    pub results: BTreeMap<String, Value>,

    /// When the workflow was created
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Build a workflow from a validated step set.
    ///
    /// Rejects duplicate step ids, self-dependencies, dependencies on unknown
    /// steps, and dependency cycles with `InvalidGraph`.
    pub fn new(topic: impl Into<String>, steps: Vec<Step>) -> Result<Self> {
        let mut step_map: BTreeMap<String, Step> = BTreeMap::new();

        for step in steps {
            if step.dependencies.contains(&step.id) {
                return Err(ReelrError::InvalidGraph(format!(
                    "step {} depends on itself",
                    step.id
                )));
            }
            let id = step.id.clone();
            if step_map.insert(id.clone(), step).is_some() {
                return Err(ReelrError::InvalidGraph(format!("duplicate step id: {}", id)));
            }
        }

        for step in step_map.values() {
            for dep in &step.dependencies {
                if !step_map.contains_key(dep) {
                    return Err(ReelrError::InvalidGraph(format!(
                        "step {} depends on unknown step {}",
                        step.id, dep
                    )));
                }
            }
        }

        validate_acyclic(&step_map)?;

        Ok(Self {
            workflow_id: generate_workflow_id(),
            topic: topic.into(),
            status: WorkflowStatus::Pending,
            steps: step_map,
            results: BTreeMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Mark every Pending step whose dependencies are all Completed as Ready
    /// and return their ids, in step-id order.
    pub fn mark_ready(&mut self) -> Vec<String> {
        let ready: Vec<String> = self
            .steps
            .values()
            .filter(|step| {
                step.status == StepStatus::Pending
                    && step.dependencies.iter().all(|dep| {
                        self.steps
                            .get(dep)
                            .map(|d| d.status == StepStatus::Completed)
                            .unwrap_or(false)
                    })
            })
            .map(|step| step.id.clone())
            .collect();

        for id in &ready {
            if let Some(step) = self.steps.get_mut(id) {
                step.status = StepStatus::Ready;
            }
        }

        ready
    }

    /// Returns true if every step is in a terminal state
    pub fn all_steps_terminal(&self) -> bool {
        self.steps.values().all(|step| step.status.is_terminal())
    }

    /// Ids of steps that ended Failed
    pub fn failed_steps(&self) -> Vec<String> {
        self.steps
            .values()
            .filter(|step| step.status == StepStatus::Failed)
            .map(|step| step.id.clone())
            .collect()
    }

    /// Ids of steps not yet in a terminal state
    pub fn unfinished_steps(&self) -> Vec<String> {
        self.steps
            .values()
            .filter(|step| !step.status.is_terminal())
            .map(|step| step.id.clone())
            .collect()
    }

    /// Fraction of steps in a terminal state, in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let terminal = self.steps.values().filter(|s| s.status.is_terminal()).count();
        terminal as f64 / self.steps.len() as f64
    }

    /// Build a snapshot of the workflow's status for callers
    pub fn report(&self) -> WorkflowReport {
        let terminal = self.steps.values().filter(|s| s.status.is_terminal()).count();
        WorkflowReport {
            workflow_id: self.workflow_id.clone(),
            topic: self.topic.clone(),
            status: self.status,
            progress: self.progress(),
            completed_steps: terminal,
            total_steps: self.steps.len(),
            created_at: self.created_at,
            steps: self
                .steps
                .values()
                .map(|step| {
                    (
                        step.id.clone(),
                        StepDetail {
                            worker: step.worker.clone(),
                            status: step.status,
                            started_at: step.started_at,
                            completed_at: step.completed_at,
                            error: step.error.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Kahn's algorithm over the dependency edges; leftover steps mean a cycle.
fn validate_acyclic(steps: &BTreeMap<String, Step>) -> Result<()> {
    let mut satisfied: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
    let mut remaining: Vec<&Step> = steps.values().collect();

    loop {
        let (ready, rest): (Vec<&Step>, Vec<&Step>) = remaining
            .into_iter()
            .partition(|step| step.dependencies.iter().all(|d| satisfied.contains(d.as_str())));

        if ready.is_empty() {
            if rest.is_empty() {
                return Ok(());
            }
            let cycle: Vec<&str> = rest.iter().map(|s| s.id.as_str()).collect();
            return Err(ReelrError::InvalidGraph(format!(
                "dependency cycle among steps: {:?}",
                cycle
            )));
        }

        for step in &ready {
            satisfied.insert(step.id.as_str());
        }
        remaining = rest;
    }
}

/// Point-in-time status snapshot of a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub workflow_id: String,
    pub topic: String,
    pub status: WorkflowStatus,
    /// Terminal steps / total steps
    pub progress: f64,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub created_at: DateTime<Utc>,
    pub steps: BTreeMap<String, StepDetail>,
}

/// Per-step detail inside a WorkflowReport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDetail {
    pub worker: String,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
