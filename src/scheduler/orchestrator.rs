//! Workflow orchestrator - drives step DAGs to completion in waves.
//!
//! The drive loop repeatedly computes the ready set (Pending steps whose
//! dependencies all completed), dispatches it concurrently through the
//! message bus, and waits for the whole wave to settle before computing the
//! next one. The wave barrier bounds concurrency to the current dependency
//! frontier and keeps result aggregation deterministic.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bus::MessageBus;
use crate::domain::{StepStatus, Workflow, WorkflowReport, WorkflowStatus};
use crate::error::{ReelrError, Result};
use crate::scheduler::template;

/// Endpoint name the orchestrator dispatches from
pub const ORCHESTRATOR_NAME: &str = "workflow_orchestrator";

/// Message type for step dispatch
const EXECUTE_TASK: &str = "execute_task";

/// Configuration for the WorkflowOrchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Per-step response bound for `send_and_await`
    pub step_timeout_ms: u64,
    /// How often the drive loop re-checks status while Paused
    pub pause_poll_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: 300000,
            pause_poll_ms: 200,
        }
    }
}

/// One dispatchable unit pulled out of a wave under the lock
struct Dispatch {
    step_id: String,
    worker: String,
    payload: Value,
}

/// Drives workflows to completion via the message bus.
///
/// The workflow registry is state owned by this instance; all mutation goes
/// through its methods and the lock is never held across an await.
pub struct WorkflowOrchestrator {
    bus: Arc<MessageBus>,
    workflows: Mutex<HashMap<String, Workflow>>,
    config: SchedulerConfig,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with default configuration
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self::with_config(bus, SchedulerConfig::default())
    }

    /// Create an orchestrator with custom configuration
    pub fn with_config(bus: Arc<MessageBus>, config: SchedulerConfig) -> Self {
        Self {
            bus,
            workflows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Create a video production workflow for a topic from the fixed template.
    ///
    /// Returns immediately with the workflow in Pending status.
    pub fn create_workflow(&self, topic: &str, duration_secs: u32) -> Result<String> {
        self.create_from_steps(topic, template::production_steps(topic, duration_secs))
    }

    /// Create a workflow from an arbitrary step set.
    ///
    /// The graph is validated at construction; cycles and unknown
    /// dependencies are rejected here, not at runtime.
    pub fn create_from_steps(&self, topic: &str, steps: Vec<crate::domain::Step>) -> Result<String> {
        let workflow = Workflow::new(topic, steps)?;
        let workflow_id = workflow.workflow_id.clone();

        tracing::info!(
            workflow_id = %workflow_id,
            topic = %topic,
            steps = workflow.steps.len(),
            "Created workflow"
        );

        self.workflows.lock().unwrap().insert(workflow_id.clone(), workflow);
        Ok(workflow_id)
    }

    /// Drive the workflow to completion.
    ///
    /// Returns the step results when every step completed. A failed step does
    /// not abort the loop; the remainder of the DAG keeps making progress
    /// until the workflow either finishes Failed (`WorkflowFailed`) or no
    /// ready steps remain (`StuckWorkflow`). Cancellation stops wave dispatch
    /// and returns the results collected so far.
    pub async fn execute(&self, workflow_id: &str) -> Result<BTreeMap<String, Value>> {
        {
            let mut workflows = self.workflows.lock().unwrap();
            let workflow = workflows
                .get_mut(workflow_id)
                .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))?;
            match workflow.status {
                WorkflowStatus::Pending => workflow.status = WorkflowStatus::Running,
                other => {
                    return Err(ReelrError::InvalidTransition(format!(
                        "cannot execute workflow in {:?} status",
                        other
                    )));
                }
            }
        }

        tracing::info!(workflow_id = %workflow_id, "Starting workflow execution");

        loop {
            // Suspend between waves while Paused; stop dispatching on cancel
            loop {
                match self.current_status(workflow_id)? {
                    WorkflowStatus::Running => break,
                    WorkflowStatus::Paused => {
                        tokio::time::sleep(Duration::from_millis(self.config.pause_poll_ms)).await;
                    }
                    WorkflowStatus::Cancelled => {
                        tracing::info!(workflow_id = %workflow_id, "Workflow cancelled, stopping dispatch");
                        return self.partial_results(workflow_id);
                    }
                    other => {
                        return Err(ReelrError::InvalidTransition(format!(
                            "workflow reached {:?} status outside the drive loop",
                            other
                        )));
                    }
                }
            }

            let wave = match self.next_wave(workflow_id)? {
                WaveOutcome::Dispatch(wave) => wave,
                WaveOutcome::Done(results) => return Ok(results),
                WaveOutcome::Finished(err) => return Err(err),
            };

            tracing::info!(
                workflow_id = %workflow_id,
                wave_size = wave.len(),
                "Dispatching wave"
            );

            let timeout = Duration::from_millis(self.config.step_timeout_ms);
            let dispatches = wave.into_iter().map(|dispatch| {
                let bus = self.bus.clone();
                async move {
                    let outcome = bus
                        .send_and_await(
                            ORCHESTRATOR_NAME,
                            &dispatch.worker,
                            EXECUTE_TASK,
                            dispatch.payload,
                            timeout,
                        )
                        .await;
                    (dispatch.step_id, outcome)
                }
            });

            // Wave barrier: wait for every dispatched call to settle before
            // computing the next ready set
            let settled = futures::future::join_all(dispatches).await;
            self.apply_wave(workflow_id, settled)?;
        }
    }

    /// Pause a running workflow. Only effective while Running.
    pub fn pause(&self, workflow_id: &str) -> bool {
        let mut workflows = self.workflows.lock().unwrap();
        match workflows.get_mut(workflow_id) {
            Some(workflow) if workflow.status == WorkflowStatus::Running => {
                workflow.status = WorkflowStatus::Paused;
                tracing::info!(workflow_id = %workflow_id, "Workflow paused");
                true
            }
            _ => false,
        }
    }

    /// Resume a paused workflow. The drive loop picks the change up between
    /// waves and continues from the current step-state snapshot.
    pub fn resume(&self, workflow_id: &str) -> bool {
        let mut workflows = self.workflows.lock().unwrap();
        match workflows.get_mut(workflow_id) {
            Some(workflow) if workflow.status == WorkflowStatus::Paused => {
                workflow.status = WorkflowStatus::Running;
                tracing::info!(workflow_id = %workflow_id, "Workflow resumed");
                true
            }
            _ => false,
        }
    }

    /// Cancel a workflow from any non-terminal status. Already-dispatched
    /// in-flight steps are allowed to finish; no new waves are dispatched.
    pub fn cancel(&self, workflow_id: &str) -> bool {
        let mut workflows = self.workflows.lock().unwrap();
        match workflows.get_mut(workflow_id) {
            Some(workflow) if !workflow.status.is_terminal() => {
                workflow.status = WorkflowStatus::Cancelled;
                tracing::info!(workflow_id = %workflow_id, "Workflow cancelled");
                true
            }
            _ => false,
        }
    }

    /// Snapshot the workflow's status, per-step detail, and progress.
    /// Available at any time, including after terminal completion.
    pub fn status(&self, workflow_id: &str) -> Result<WorkflowReport> {
        let workflows = self.workflows.lock().unwrap();
        workflows
            .get(workflow_id)
            .map(|workflow| workflow.report())
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))
    }

    /// Step results of a completed workflow.
    pub fn results(&self, workflow_id: &str) -> Result<BTreeMap<String, Value>> {
        let workflows = self.workflows.lock().unwrap();
        let workflow = workflows
            .get(workflow_id)
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))?;
        if workflow.status != WorkflowStatus::Completed {
            return Err(ReelrError::InvalidTransition(format!(
                "workflow in {:?} status has no final results",
                workflow.status
            )));
        }
        Ok(workflow.results.clone())
    }

    /// Ids of all workflows this orchestrator holds
    pub fn workflow_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.workflows.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn current_status(&self, workflow_id: &str) -> Result<WorkflowStatus> {
        let workflows = self.workflows.lock().unwrap();
        workflows
            .get(workflow_id)
            .map(|workflow| workflow.status)
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))
    }

    /// Step results collected so far, regardless of workflow status.
    pub fn partial_results(&self, workflow_id: &str) -> Result<BTreeMap<String, Value>> {
        let workflows = self.workflows.lock().unwrap();
        workflows
            .get(workflow_id)
            .map(|workflow| workflow.results.clone())
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))
    }

    /// Compute the next wave under the lock, marking its steps Running and
    /// building their dispatch payloads (task + completed dependency inputs).
    fn next_wave(&self, workflow_id: &str) -> Result<WaveOutcome> {
        let mut workflows = self.workflows.lock().unwrap();
        let workflow = workflows
            .get_mut(workflow_id)
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))?;

        let ready = workflow.mark_ready();

        if ready.is_empty() {
            if workflow.all_steps_terminal() {
                let failed = workflow.failed_steps();
                if failed.is_empty() {
                    workflow.status = WorkflowStatus::Completed;
                    tracing::info!(workflow_id = %workflow_id, "Workflow completed");
                    return Ok(WaveOutcome::Done(workflow.results.clone()));
                }
                workflow.status = WorkflowStatus::Failed;
                tracing::error!(
                    workflow_id = %workflow_id,
                    failed = ?failed,
                    "Workflow failed"
                );
                return Ok(WaveOutcome::Finished(ReelrError::WorkflowFailed {
                    workflow_id: workflow_id.to_string(),
                    failed_steps: failed,
                }));
            }

            // Residual unsatisfiable steps: a dependency failed or an invalid
            // graph escaped construction-time validation
            let stuck = workflow.unfinished_steps();
            workflow.status = WorkflowStatus::Failed;
            tracing::error!(
                workflow_id = %workflow_id,
                stuck = ?stuck,
                "Workflow stuck, no ready steps remain"
            );
            return Ok(WaveOutcome::Finished(ReelrError::StuckWorkflow {
                workflow_id: workflow_id.to_string(),
                stuck_steps: stuck,
            }));
        }

        let mut wave = Vec::with_capacity(ready.len());
        for step_id in ready {
            let inputs: Map<String, Value> = workflow
                .steps
                .get(&step_id)
                .map(|step| {
                    step.dependencies
                        .iter()
                        .filter_map(|dep| {
                            workflow.results.get(dep).map(|result| (dep.clone(), result.clone()))
                        })
                        .collect()
                })
                .unwrap_or_default();

            if let Some(step) = workflow.steps.get_mut(&step_id) {
                step.status = StepStatus::Running;
                step.started_at = Some(Utc::now());

                let mut payload = step.task.clone();
                match &mut payload {
                    Value::Object(map) => {
                        map.insert("inputs".to_string(), Value::Object(inputs));
                    }
                    other => {
                        let wrapped = serde_json::json!({
                            "task": other.clone(),
                            "inputs": inputs,
                        });
                        payload = wrapped;
                    }
                }

                wave.push(Dispatch {
                    step_id: step.id.clone(),
                    worker: step.worker.clone(),
                    payload,
                });
            }
        }

        Ok(WaveOutcome::Dispatch(wave))
    }

    /// Record the settled wave's outcomes on the workflow.
    fn apply_wave(
        &self,
        workflow_id: &str,
        settled: Vec<(String, Result<crate::domain::MessageResponse>)>,
    ) -> Result<()> {
        let mut workflows = self.workflows.lock().unwrap();
        let workflow = workflows
            .get_mut(workflow_id)
            .ok_or_else(|| ReelrError::WorkflowNotFound(workflow_id.to_string()))?;

        for (step_id, outcome) in settled {
            let Some(step) = workflow.steps.get_mut(&step_id) else {
                continue;
            };

            match outcome {
                Ok(response) if response.success => {
                    tracing::info!(workflow_id = %workflow_id, step = %step_id, "Step completed");
                    step.complete(response.content.clone());
                    workflow.results.insert(step_id, response.content);
                }
                Ok(response) => {
                    let error = response
                        .error_message
                        .unwrap_or_else(|| "worker returned failure without detail".to_string());
                    tracing::error!(workflow_id = %workflow_id, step = %step_id, error = %error, "Step failed");
                    step.fail(error);
                }
                Err(e) => {
                    tracing::error!(workflow_id = %workflow_id, step = %step_id, error = %e, "Step dispatch failed");
                    step.fail(e.to_string());
                }
            }
        }

        Ok(())
    }
}

/// What the ready-set computation decided for this round
enum WaveOutcome {
    /// Steps to dispatch concurrently
    Dispatch(Vec<Dispatch>),
    /// Every step completed; the workflow is done
    Done(BTreeMap<String, Value>),
    /// Terminal failure (failed steps or stuck graph)
    Finished(ReelrError),
}
