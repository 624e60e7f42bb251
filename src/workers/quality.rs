//! Quality validation worker - runs the quality gate over production assets.
//!
//! Bundles the voice, visual, and thumbnail results into one asset bundle,
//! scores it with the heuristic assessor, and loops improvements through the
//! gate until standards are met or the budget runs out. The serialized gate
//! report is the step result.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::bus::Worker;
use crate::domain::{Message, QualityAssessment, QualityIssue, Severity};
use crate::error::{ReelrError, Result};
use crate::quality::{AssetImprover, QualityAssessor, QualityGate, QualityGateConfig};
use crate::scheduler::template;

/// Scores an asset bundle per component and flags components below standard.
///
/// Scores react to the `{component}_improved` flags the improver sets, so
/// the gate can converge instead of re-reporting the same issues forever.
pub struct HeuristicAssessor {
    min_component_score: f64,
}

impl HeuristicAssessor {
    pub fn new(min_component_score: f64) -> Self {
        Self { min_component_score }
    }

    fn score_script(&self, assets: &Value) -> f64 {
        let scene_count = assets["visuals"]["scene_count"].as_u64().unwrap_or(0);
        (0.3 + scene_count as f64 * 0.1).min(1.0)
    }

    fn component_score(&self, assets: &Value, component: &str, base: f64) -> f64 {
        let improved = assets[format!("{}_improved", component)]
            .as_bool()
            .unwrap_or(false);
        if improved { (base + 0.2).min(1.0) } else { base }
    }
}

#[async_trait]
impl QualityAssessor for HeuristicAssessor {
    async fn assess(&self, assets: &Value) -> Result<QualityAssessment> {
        let mut component_scores = BTreeMap::new();
        component_scores.insert(
            "script_quality".to_string(),
            self.component_score(assets, "script_quality", self.score_script(assets)),
        );
        component_scores.insert(
            "audio_quality".to_string(),
            self.component_score(assets, "audio_quality", 0.7),
        );
        component_scores.insert(
            "visual_quality".to_string(),
            self.component_score(assets, "visual_quality", 0.6),
        );
        component_scores.insert(
            "engagement_potential".to_string(),
            self.component_score(assets, "engagement_potential", 0.8),
        );

        let overall_score =
            component_scores.values().sum::<f64>() / component_scores.len() as f64;

        let issues: Vec<QualityIssue> = component_scores
            .iter()
            .filter(|(_, score)| **score < self.min_component_score)
            .map(|(component, score)| QualityIssue {
                component: component.clone(),
                description: format!("Low {} score: {:.2}", component, score),
                severity: if *score < 0.5 { Severity::High } else { Severity::Medium },
            })
            .collect();

        Ok(QualityAssessment {
            overall_score,
            component_scores,
            issues,
        })
    }
}

/// Marks each actioned component as improved on the bundle.
pub struct HeuristicImprover;

#[async_trait]
impl AssetImprover for HeuristicImprover {
    async fn improve(
        &self,
        assets: Value,
        actions: &[crate::domain::ImprovementAction],
    ) -> Result<Value> {
        let mut bundle = match assets {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("assets".to_string(), other);
                map
            }
        };

        for action in actions {
            bundle.insert(format!("{}_improved", action.component), Value::Bool(true));
        }

        Ok(Value::Object(bundle))
    }
}

/// The quality-validation step's worker.
pub struct QualityWorker {
    assessor: Arc<HeuristicAssessor>,
    improver: Arc<HeuristicImprover>,
    config: QualityGateConfig,
}

impl QualityWorker {
    pub fn new(config: QualityGateConfig, min_component_score: f64) -> Self {
        Self {
            assessor: Arc::new(HeuristicAssessor::new(min_component_score)),
            improver: Arc::new(HeuristicImprover),
            config,
        }
    }

    /// Gate configuration for one request, honoring quality_standards
    /// overrides carried in the task payload.
    fn gate_config(&self, content: &Value) -> QualityGateConfig {
        let mut config = self.config.clone();
        if let Some(min_score) = content["quality_standards"]["min_score"].as_f64() {
            config.threshold = min_score;
        }
        config
    }
}

#[async_trait]
impl Worker for QualityWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let audio = template::dependency_input(&message.content, template::VOICEOVER_PRODUCTION);
        let visuals = template::dependency_input(&message.content, template::VISUAL_PRODUCTION);
        let thumbnail = template::dependency_input(&message.content, template::THUMBNAIL_CREATION);

        if audio.is_none() && visuals.is_none() && thumbnail.is_none() {
            return Err(ReelrError::HandlerFailure(
                "no production assets present in inputs".to_string(),
            ));
        }

        let bundle = json!({
            "audio": audio.cloned().unwrap_or(Value::Null),
            "visuals": visuals.cloned().unwrap_or(Value::Null),
            "thumbnail": thumbnail.cloned().unwrap_or(Value::Null),
        });

        let gate = QualityGate::with_config(
            self.assessor.clone(),
            self.improver.clone(),
            self.gate_config(&message.content),
        );

        let report = gate.run(bundle).await?;

        tracing::info!(
            final_score = report.final_score,
            iterations = report.iterations_performed,
            meets_standards = report.meets_standards,
            "Quality validation finished"
        );

        Ok(serde_json::to_value(report)?)
    }
}
