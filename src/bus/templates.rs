//! Pre-defined task payload templates for common worker requests.
//!
//! The workflow template uses these to build step tasks; callers composing
//! custom workflows can reuse them to stay on the expected shapes.

use serde_json::{json, Value};

/// Task payload for a research step
pub fn research_request(topic: &str, research_type: &str) -> Value {
    json!({
        "action": "research",
        "topic": topic,
        "research_type": research_type,
        "requirements": {
            "depth": "comprehensive",
            "sources": ["academic", "news", "trends"]
        }
    })
}

/// Task payload for the script-writing step
pub fn script_request(topic: &str, duration_secs: u32) -> Value {
    json!({
        "action": "write_script",
        "topic": topic,
        "duration": duration_secs
    })
}

/// Task payload for a production step (voice, visuals, thumbnail)
pub fn production_request(asset_kind: &str) -> Value {
    json!({
        "action": "produce_asset",
        "asset_kind": asset_kind,
        "output_format": "mp4",
        "quality_preset": "youtube_hd"
    })
}

/// Task payload for the quality-validation step
pub fn quality_validation_request(min_score: f64, min_component_score: f64) -> Value {
    json!({
        "action": "validate_quality",
        "quality_standards": {
            "min_score": min_score,
            "min_component_score": min_component_score,
            "required_components": ["script", "audio", "visuals"]
        }
    })
}

/// Task payload for the final-assembly step
pub fn assembly_request(topic: &str) -> Value {
    json!({
        "action": "assemble_video",
        "topic": topic,
        "output_format": "mp4"
    })
}
