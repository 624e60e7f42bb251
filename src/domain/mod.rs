//! Domain types for Reelr
//!
//! The data model shared across the bus, the scheduler, and the quality gate:
//! messages and their responses, workflow steps, workflows, and quality
//! assessment types.

pub mod assessment;
pub mod message;
pub mod step;
pub mod workflow;

pub use assessment::{ImprovementAction, QualityAssessment, QualityIssue, Severity};
pub use message::{Message, MessagePriority, MessageResponse};
pub use step::{Step, StepStatus};
pub use workflow::{StepDetail, Workflow, WorkflowReport, WorkflowStatus};
