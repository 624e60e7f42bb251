//! Quality gate loop implementation.
//!
//! Each iteration:
//! 1. Assess the current asset bundle for a scalar score and per-aspect issues
//! 2. Score at or above threshold: standards met, stop
//! 3. Otherwise derive one improvement action per issue and apply them
//! 4. Stop after max iterations with the last computed score
//!
//! The loop is monotonic in iteration count but not in score; an improvement
//! pass may regress the score. The report carries both the last computed
//! score (the contract) and the best score seen.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ImprovementAction, QualityAssessment};
use crate::error::Result;

/// Produces a scored assessment of an asset bundle.
#[async_trait]
pub trait QualityAssessor: Send + Sync {
    /// Score the bundle in [0, 1] and list per-aspect issues.
    async fn assess(&self, assets: &Value) -> Result<QualityAssessment>;
}

/// Applies improvement actions to an asset bundle.
#[async_trait]
pub trait AssetImprover: Send + Sync {
    /// Produce an updated bundle with the actions applied.
    async fn improve(&self, assets: Value, actions: &[ImprovementAction]) -> Result<Value>;
}

/// Configuration for the QualityGate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateConfig {
    /// Overall score required to meet standards
    pub threshold: f64,
    /// Iteration budget
    pub max_iterations: u32,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            max_iterations: 5,
        }
    }
}

/// Outcome of a quality gate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// The last computed score
    pub final_score: f64,

    /// The best score any iteration produced
    pub best_score: f64,

    pub iterations_performed: u32,

    pub meets_standards: bool,

    /// Ordered log of every improvement action applied
    pub improvements_applied: Vec<ImprovementAction>,

    /// The asset bundle as it stood when the loop stopped
    pub assets: Value,
}

/// Bounded quality-gated refinement loop.
pub struct QualityGate<A, I>
where
    A: QualityAssessor,
    I: AssetImprover,
{
    assessor: Arc<A>,
    improver: Arc<I>,
    config: QualityGateConfig,
}

impl<A, I> QualityGate<A, I>
where
    A: QualityAssessor,
    I: AssetImprover,
{
    /// Create a gate with default configuration.
    pub fn new(assessor: Arc<A>, improver: Arc<I>) -> Self {
        Self::with_config(assessor, improver, QualityGateConfig::default())
    }

    /// Create a gate with custom configuration.
    pub fn with_config(assessor: Arc<A>, improver: Arc<I>, config: QualityGateConfig) -> Self {
        Self {
            assessor,
            improver,
            config,
        }
    }

    /// Run the loop over an initial asset bundle.
    pub async fn run(&self, initial_assets: Value) -> Result<QualityReport> {
        let mut assets = initial_assets;
        let mut iteration = 0;
        let mut final_score = 0.0;
        let mut best_score = 0.0_f64;
        let mut meets_standards = false;
        let mut improvements_applied = Vec::new();

        while iteration < self.config.max_iterations {
            iteration += 1;

            let assessment = self.assessor.assess(&assets).await?;
            final_score = assessment.overall_score;
            best_score = best_score.max(final_score);

            tracing::info!(
                iteration = iteration,
                score = final_score,
                threshold = self.config.threshold,
                issues = assessment.issues.len(),
                "Quality assessment"
            );

            if final_score >= self.config.threshold {
                meets_standards = true;
                break;
            }

            // One suggested remedy per issue, independent of other issues
            let actions: Vec<ImprovementAction> = assessment
                .issues
                .iter()
                .map(ImprovementAction::for_issue)
                .collect();

            if !actions.is_empty() {
                tracing::info!(count = actions.len(), "Applying improvements");
                assets = self.improver.improve(assets, &actions).await?;
                improvements_applied.extend(actions);
            }
        }

        if !meets_standards {
            tracing::warn!(
                iterations = iteration,
                final_score = final_score,
                "Quality standards not met within iteration budget"
            );
        }

        Ok(QualityReport {
            final_score,
            best_score,
            iterations_performed: iteration,
            meets_standards,
            improvements_applied,
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QualityIssue, Severity};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns scripted scores on successive calls, repeating the last one
    struct ScriptedAssessor {
        scores: Vec<f64>,
        calls: AtomicUsize,
        issues_per_call: usize,
    }

    impl ScriptedAssessor {
        fn new(scores: Vec<f64>) -> Self {
            Self {
                scores,
                calls: AtomicUsize::new(0),
                issues_per_call: 1,
            }
        }

        fn without_issues(scores: Vec<f64>) -> Self {
            Self {
                scores,
                calls: AtomicUsize::new(0),
                issues_per_call: 0,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QualityAssessor for ScriptedAssessor {
        async fn assess(&self, _assets: &Value) -> Result<QualityAssessment> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let score = self
                .scores
                .get(call)
                .or_else(|| self.scores.last())
                .copied()
                .unwrap_or(0.0);

            let issues = (0..self.issues_per_call)
                .map(|_| QualityIssue {
                    component: "visual_quality".to_string(),
                    description: format!("Low visual_quality score: {:.2}", score),
                    severity: Severity::Medium,
                })
                .collect();

            Ok(QualityAssessment {
                overall_score: score,
                component_scores: Default::default(),
                issues,
            })
        }
    }

    /// Counts improve calls and passes assets through untouched
    struct CountingImprover {
        calls: AtomicUsize,
    }

    impl CountingImprover {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssetImprover for CountingImprover {
        async fn improve(&self, assets: Value, _actions: &[ImprovementAction]) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(assets)
        }
    }

    #[test]
    fn test_gate_config_default() {
        let config = QualityGateConfig::default();
        assert_eq!(config.threshold, 0.8);
        assert_eq!(config.max_iterations, 5);
    }

    #[tokio::test]
    async fn test_gate_stops_when_threshold_met() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.5, 0.6, 0.9]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::new(assessor.clone(), improver.clone());

        let report = gate.run(json!({})).await.unwrap();

        assert_eq!(report.iterations_performed, 3);
        assert!(report.meets_standards);
        assert_eq!(report.final_score, 0.9);
        assert_eq!(report.best_score, 0.9);
        assert_eq!(assessor.call_count(), 3);
        // Improved after the two failing assessments only
        assert_eq!(improver.call_count(), 2);
        assert_eq!(report.improvements_applied.len(), 2);
    }

    #[tokio::test]
    async fn test_gate_exhausts_iteration_budget() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.3]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::new(assessor.clone(), improver.clone());

        let report = gate.run(json!({})).await.unwrap();

        assert_eq!(report.iterations_performed, 5);
        assert!(!report.meets_standards);
        assert_eq!(report.final_score, 0.3);
        assert_eq!(improver.call_count(), 5);
        assert_eq!(report.improvements_applied.len(), 5);
    }

    #[tokio::test]
    async fn test_gate_first_pass_needs_no_improvements() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.95]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::new(assessor.clone(), improver.clone());

        let report = gate.run(json!({"already": "good"})).await.unwrap();

        assert_eq!(report.iterations_performed, 1);
        assert!(report.meets_standards);
        assert_eq!(improver.call_count(), 0);
        assert!(report.improvements_applied.is_empty());
        assert_eq!(report.assets, json!({"already": "good"}));
    }

    #[tokio::test]
    async fn test_gate_reports_last_score_not_best() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.7, 0.5]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::with_config(
            assessor,
            improver,
            QualityGateConfig {
                threshold: 0.9,
                max_iterations: 2,
            },
        );

        let report = gate.run(json!({})).await.unwrap();

        // A regression is allowed; the last score is the contract
        assert_eq!(report.final_score, 0.5);
        assert_eq!(report.best_score, 0.7);
        assert!(!report.meets_standards);
    }

    #[tokio::test]
    async fn test_gate_zero_iteration_budget() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.9]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::with_config(
            assessor.clone(),
            improver,
            QualityGateConfig {
                threshold: 0.8,
                max_iterations: 0,
            },
        );

        let report = gate.run(json!({})).await.unwrap();

        assert_eq!(report.iterations_performed, 0);
        assert!(!report.meets_standards);
        assert_eq!(report.final_score, 0.0);
        assert_eq!(assessor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gate_no_issues_means_no_improve_calls() {
        let assessor = Arc::new(ScriptedAssessor::without_issues(vec![0.5]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::with_config(
            assessor,
            improver.clone(),
            QualityGateConfig {
                threshold: 0.8,
                max_iterations: 3,
            },
        );

        let report = gate.run(json!({})).await.unwrap();

        assert_eq!(report.iterations_performed, 3);
        assert!(!report.meets_standards);
        assert_eq!(improver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_gate_report_serialization_roundtrip() {
        let assessor = Arc::new(ScriptedAssessor::new(vec![0.9]));
        let improver = Arc::new(CountingImprover::new());
        let gate = QualityGate::new(assessor, improver);

        let report = gate.run(json!({"bundle": true})).await.unwrap();
        let encoded = serde_json::to_string(&report).unwrap();
        let decoded: QualityReport = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.final_score, 0.9);
        assert!(decoded.meets_standards);
        assert_eq!(decoded.assets, json!({"bundle": true}));
    }
}
