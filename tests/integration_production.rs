//! End-to-end production pipeline integration tests
//!
//! Exercises the full workflow: bus + registered production team +
//! orchestrator + quality gate, plus the cross-component properties the
//! design guarantees.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use reelr::bus::{MessageBus, Worker};
use reelr::config::Config;
use reelr::domain::{Message, MessagePriority, Step, StepStatus, WorkflowStatus};
use reelr::error::{ReelrError, Result};
use reelr::pipeline::ProductionPipeline;
use reelr::quality::QualityReport;
use reelr::scheduler::template;

struct CountingWorker {
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl Worker for CountingWorker {
    async fn handle(&self, _message: &Message) -> Result<Value> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(json!({}))
    }
}

struct FailingWorker;

#[async_trait]
impl Worker for FailingWorker {
    async fn handle(&self, _message: &Message) -> Result<Value> {
        Err(ReelrError::HandlerFailure("backend offline".to_string()))
    }
}

/// Integration test: a full production run completes and meets standards
#[tokio::test]
async fn test_full_production_run() {
    let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
    let result = pipeline.produce("Rust Async Programming", 600).await.unwrap();

    assert!(result.success);
    assert_eq!(result.step_results.len(), 9);
    assert!(result.meets_standards);
    assert!(result.quality_score.unwrap() >= 0.8);

    // The quality step's result deserializes back into a gate report
    let report: QualityReport =
        serde_json::from_value(result.step_results[template::QUALITY_VALIDATION].clone()).unwrap();
    assert!(report.meets_standards);
    assert!(report.iterations_performed >= 1);

    // The assembly descriptor points at the slugified deliverable
    let video = result.video.unwrap();
    assert_eq!(
        video["file"].as_str().unwrap(),
        "output_videos/rust-async-programming.mp4"
    );

    pipeline.shutdown();
}

/// Integration test: per-step detail is retrievable after completion
#[tokio::test]
async fn test_status_detail_after_completion() {
    let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
    let result = pipeline.produce("woodworking", 300).await.unwrap();

    let orchestrator = pipeline.orchestrator();
    let report = orchestrator.status(&result.workflow_id).unwrap();

    assert_eq!(report.status, WorkflowStatus::Completed);
    assert_eq!(report.progress, 1.0);
    assert_eq!(report.total_steps, 9);
    for (step_id, detail) in &report.steps {
        assert_eq!(detail.status, StepStatus::Completed, "step {}", step_id);
        assert!(detail.started_at.is_some());
        assert!(detail.completed_at.is_some());
        assert!(detail.error.is_none());
    }

    // Terminal workflows reject further control transitions
    assert!(!orchestrator.pause(&result.workflow_id));
    assert!(!orchestrator.resume(&result.workflow_id));
    assert!(!orchestrator.cancel(&result.workflow_id));

    pipeline.shutdown();
}

/// Integration test: a failed research step leaves its dependents stuck and
/// the workflow failed, with the error retained for diagnosis
#[tokio::test]
async fn test_failed_dependency_surfaces_as_stuck_workflow() {
    let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
    pipeline
        .bus()
        .register(reelr::workers::names::RESEARCHER_FACTS, Arc::new(FailingWorker));

    let result = pipeline.produce("rust", 600).await.unwrap();

    assert!(!result.success);
    assert!(result.error.unwrap().contains("stuck"));

    let report = pipeline.orchestrator().status(&result.workflow_id).unwrap();
    assert_eq!(report.status, WorkflowStatus::Failed);
    assert_eq!(report.steps[template::RESEARCH_FACTS].status, StepStatus::Failed);
    assert!(report.steps[template::RESEARCH_FACTS]
        .error
        .as_ref()
        .unwrap()
        .contains("backend offline"));
    // Script writing never became ready, let alone its dependents
    assert_eq!(report.steps[template::SCRIPT_WRITING].status, StepStatus::Pending);
    assert_eq!(report.steps[template::FINAL_ASSEMBLY].status, StepStatus::Pending);

    pipeline.shutdown();
}

/// Integration test: custom workflows run through the same pipeline bus
#[tokio::test]
async fn test_custom_workflow_on_pipeline_bus() {
    let pipeline = ProductionPipeline::new(&Config::default()).unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    pipeline
        .bus()
        .register("side_channel", Arc::new(CountingWorker { count: count.clone() }));

    let steps = vec![
        Step::new("first", "side_channel", json!({})),
        Step::new("second", "side_channel", json!({})).with_dependencies(["first"]),
    ];
    let orchestrator = pipeline.orchestrator();
    let id = orchestrator.create_from_steps("side work", steps).unwrap();
    let results = orchestrator.execute(&id).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);

    pipeline.shutdown();
}

/// Integration test: broadcast reaches every registered worker except the
/// sender, even when one delivery's handler fails
#[tokio::test]
async fn test_broadcast_deliveries_are_independent() {
    let bus = MessageBus::new();
    bus.start().unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    bus.register("healthy_a", Arc::new(CountingWorker { count: count.clone() }));
    bus.register("faulty", Arc::new(FailingWorker));
    bus.register("healthy_b", Arc::new(CountingWorker { count: count.clone() }));
    bus.register("announcer", Arc::new(CountingWorker { count: count.clone() }));

    let delivered = bus
        .broadcast("announcer", "announce", json!({"take": 1}), None)
        .await
        .unwrap();

    // Three targets once the sender is excluded
    assert_eq!(delivered, 3);
    tokio::time::sleep(Duration::from_millis(100)).await;
    // The failing delivery didn't stop the healthy ones
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

/// Integration test: the bus serializes handler invocation in enqueue order
/// while concurrent awaiting callers each get their own response
#[tokio::test]
async fn test_concurrent_send_and_await_callers() {
    let bus = Arc::new(MessageBus::new());
    bus.start().unwrap();

    bus.register(
        "adder",
        Arc::new(reelr::bus::FnWorker::new(|msg| {
            Box::pin(async move {
                let n = msg.content["n"].as_u64().unwrap_or(0);
                Ok(json!({"doubled": n * 2}))
            })
        })),
    );

    let calls: Vec<_> = (0..8u64)
        .map(|n| {
            let bus = bus.clone();
            tokio::spawn(async move {
                bus.send_and_await("tester", "adder", "execute_task", json!({"n": n}), Duration::from_secs(5))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for (n, call) in calls.into_iter().enumerate() {
        let response = call.await.unwrap();
        assert!(response.success);
        assert_eq!(response.content["doubled"], (n as u64) * 2);
    }
}

/// Integration test: fire-and-forget sends with advisory priority all land
#[tokio::test]
async fn test_priority_is_advisory_only() {
    let bus = MessageBus::new();
    bus.start().unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    bus.register("sink", Arc::new(CountingWorker { count: count.clone() }));

    for priority in [MessagePriority::Low, MessagePriority::Normal, MessagePriority::High] {
        bus.send("tester", "sink", "notify", json!({}), priority).await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(count.load(Ordering::SeqCst), 3);
}
