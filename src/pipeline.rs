//! Production pipeline facade - wires the bus, workers, and orchestrator.
//!
//! One ProductionPipeline owns one bus (with the production team registered
//! and the processing loop running) and one orchestrator. `produce` runs the
//! whole workflow for a topic and folds the outcome into a single result;
//! workflow failure is reported in the result, not as a crate error.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::bus::MessageBus;
use crate::config::Config;
use crate::error::{ReelrError, Result};
use crate::scheduler::{template, WorkflowOrchestrator};
use crate::workers;

/// Outcome of one production run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionResult {
    pub success: bool,
    pub workflow_id: String,
    /// Final video descriptor from the assembly step
    pub video: Option<Value>,
    pub quality_score: Option<f64>,
    pub meets_standards: bool,
    /// Per-step results, partial when the run failed
    pub step_results: BTreeMap<String, Value>,
    /// Failure description, present iff success is false
    pub error: Option<String>,
}

/// The top-level production pipeline.
pub struct ProductionPipeline {
    bus: Arc<MessageBus>,
    orchestrator: Arc<WorkflowOrchestrator>,
    processor: JoinHandle<()>,
}

impl ProductionPipeline {
    /// Build the bus, register the production team, start the processing
    /// loop, and stand up the orchestrator.
    pub fn new(config: &Config) -> Result<Self> {
        let bus = Arc::new(MessageBus::with_config(config.bus.clone()));
        workers::register_production_workers(&bus, config);
        let processor = bus.start()?;
        let orchestrator = Arc::new(WorkflowOrchestrator::with_config(
            bus.clone(),
            config.scheduler.clone(),
        ));

        Ok(Self {
            bus,
            orchestrator,
            processor,
        })
    }

    /// The orchestrator, for status/pause/resume/cancel by workflow id.
    pub fn orchestrator(&self) -> Arc<WorkflowOrchestrator> {
        self.orchestrator.clone()
    }

    /// The underlying bus, for registering additional workers.
    pub fn bus(&self) -> Arc<MessageBus> {
        self.bus.clone()
    }

    /// Produce a video for a topic: create the workflow, execute it, and
    /// summarize the outcome.
    pub async fn produce(&self, topic: &str, duration_secs: u32) -> Result<ProductionResult> {
        let workflow_id = self.orchestrator.create_workflow(topic, duration_secs)?;
        tracing::info!(workflow_id = %workflow_id, topic = %topic, "Producing video");

        match self.orchestrator.execute(&workflow_id).await {
            Ok(results) => {
                let assembly = results
                    .get(template::FINAL_ASSEMBLY)
                    .cloned()
                    .unwrap_or(Value::Null);

                Ok(ProductionResult {
                    success: true,
                    workflow_id,
                    video: assembly.get("video").cloned(),
                    quality_score: assembly["quality_score"].as_f64(),
                    meets_standards: assembly["meets_standards"].as_bool().unwrap_or(false),
                    step_results: results,
                    error: None,
                })
            }
            Err(e @ (ReelrError::WorkflowFailed { .. } | ReelrError::StuckWorkflow { .. })) => {
                let step_results = self.orchestrator.partial_results(&workflow_id)?;
                Ok(ProductionResult {
                    success: false,
                    workflow_id,
                    video: None,
                    quality_score: None,
                    meets_standards: false,
                    step_results,
                    error: Some(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Stop the bus's processing loop.
    pub fn shutdown(self) {
        self.processor.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Worker;
    use crate::domain::{Message, StepStatus, WorkflowStatus};
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingWorker;

    #[async_trait]
    impl Worker for FailingWorker {
        async fn handle(&self, _message: &Message) -> Result<Value> {
            Err(ReelrError::HandlerFailure("render farm down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_pipeline_produces_video_end_to_end() {
        let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
        let result = pipeline.produce("rust programming", 600).await.unwrap();

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.step_results.len(), 9);
        assert!(result.meets_standards);
        assert!(result.quality_score.unwrap() >= 0.8);

        let video = result.video.unwrap();
        assert!(video["file"].as_str().unwrap().ends_with("rust-programming.mp4"));
        assert!(video["duration_seconds"].as_u64().unwrap() > 0);

        let report = pipeline.orchestrator().status(&result.workflow_id).unwrap();
        assert_eq!(report.status, WorkflowStatus::Completed);
        assert_eq!(report.progress, 1.0);
        for detail in report.steps.values() {
            assert_eq!(detail.status, StepStatus::Completed);
        }

        pipeline.shutdown();
    }

    #[tokio::test]
    async fn test_pipeline_reports_failure_with_partial_results() {
        let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
        // Re-registration replaces the healthy quality validator
        pipeline.bus().register(workers::names::QUALITY_VALIDATOR, Arc::new(FailingWorker));

        let result = pipeline.produce("rust programming", 600).await.unwrap();

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("stuck"), "unexpected error: {}", error);
        assert!(result.video.is_none());
        // Everything up to the quality gate still ran
        assert!(result.step_results.contains_key(template::SCRIPT_WRITING));
        assert!(result.step_results.contains_key(template::VISUAL_PRODUCTION));
        assert!(!result.step_results.contains_key(template::FINAL_ASSEMBLY));

        let report = pipeline.orchestrator().status(&result.workflow_id).unwrap();
        assert_eq!(report.status, WorkflowStatus::Failed);
        assert_eq!(report.steps[template::QUALITY_VALIDATION].status, StepStatus::Failed);
        assert_eq!(report.steps[template::FINAL_ASSEMBLY].status, StepStatus::Pending);

        pipeline.shutdown();
    }

    #[tokio::test]
    async fn test_production_result_serialization() {
        let result = ProductionResult {
            success: true,
            workflow_id: "workflow-1-abcd".to_string(),
            video: Some(json!({"file": "out.mp4"})),
            quality_score: Some(0.85),
            meets_standards: true,
            step_results: BTreeMap::new(),
            error: None,
        };

        let encoded = serde_json::to_string(&result).unwrap();
        let decoded: ProductionResult = serde_json::from_str(&encoded).unwrap();
        assert!(decoded.success);
        assert_eq!(decoded.quality_score, Some(0.85));
    }
}
