//! Error types for Reelr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Reelr
#[derive(Debug, Error)]
pub enum ReelrError {
    /// Workflow not found in the orchestrator's registry
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Message addressed to a worker name nobody registered
    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    /// No response arrived within the configured bound
    #[error("Response timeout after {0}ms")]
    Timeout(u64),

    /// A registered handler raised or returned an explicit failure
    #[error("Handler failure: {0}")]
    HandlerFailure(String),

    /// No ready steps remain but the workflow is not fully terminal
    #[error("Workflow {workflow_id} is stuck; unsatisfiable steps: {stuck_steps:?}")]
    StuckWorkflow {
        workflow_id: String,
        stuck_steps: Vec<String>,
    },

    /// Workflow reached a terminal Failed status
    #[error("Workflow {workflow_id} failed; failed steps: {failed_steps:?}")]
    WorkflowFailed {
        workflow_id: String,
        failed_steps: Vec<String>,
    },

    /// Pause/resume/cancel/execute requested from an incompatible status
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Step graph rejected at construction time (cycle, self- or unknown dependency)
    #[error("Invalid step graph: {0}")]
    InvalidGraph(String),

    /// The bus's processing loop is gone or was never started
    #[error("Message bus is not running")]
    BusClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Reelr operations
pub type Result<T> = std::result::Result<T, ReelrError>;
