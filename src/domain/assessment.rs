//! Quality assessment types
//!
//! The structured output of a quality assessment pass and the improvement
//! actions derived from it. The gate loop consumes these; the scoring
//! heuristic that produces them lives with the quality worker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How badly an issue drags quality down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One identified quality problem in an asset bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// Which scored component the issue belongs to
    pub component: String,

    /// Human-readable description
    pub description: String,

    pub severity: Severity,
}

/// Result of one assessment pass over an asset bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Aggregate score in [0, 1]
    pub overall_score: f64,

    /// Per-component scores the aggregate was derived from
    pub component_scores: BTreeMap<String, f64>,

    /// Issues found, one per component below standard
    pub issues: Vec<QualityIssue>,
}

/// A suggested remedy for a single issue, independent of other issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementAction {
    pub component: String,

    /// The issue description this action responds to
    pub issue: String,

    /// What to do about it
    pub suggestion: String,

    pub priority: Severity,
}

impl ImprovementAction {
    /// Derive the remedy for an issue from its component.
    pub fn for_issue(issue: &QualityIssue) -> Self {
        let suggestion = match issue.component.as_str() {
            "script_quality" => "Rewrite script with more engaging content and clear structure",
            "audio_quality" => "Improve audio clarity and add background music",
            "visual_quality" => "Enhance visuals with better graphics and transitions",
            "engagement_potential" => "Add hooks and calls to action to improve engagement",
            _ => "General quality improvement needed",
        };

        Self {
            component: issue.component.clone(),
            issue: issue.description.clone(),
            suggestion: suggestion.to_string(),
            priority: issue.severity,
        }
    }
}
