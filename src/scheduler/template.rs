//! The fixed video production workflow template.
//!
//! Research steps run first with no dependencies; script writing depends on
//! all research; voice, visual, and thumbnail production depend on the
//! script; quality validation depends on all production steps; final assembly
//! depends on validation.

use serde_json::Value;

use crate::bus::templates;
use crate::domain::Step;
use crate::workers::names;

pub const RESEARCH_TRENDS: &str = "research_trends";
pub const RESEARCH_FACTS: &str = "research_facts";
pub const RESEARCH_COMPETITION: &str = "research_competition";
pub const SCRIPT_WRITING: &str = "script_writing";
pub const VOICEOVER_PRODUCTION: &str = "voiceover_production";
pub const VISUAL_PRODUCTION: &str = "visual_production";
pub const THUMBNAIL_CREATION: &str = "thumbnail_creation";
pub const QUALITY_VALIDATION: &str = "quality_validation";
pub const FINAL_ASSEMBLY: &str = "final_assembly";

/// Overall score a production run must reach to pass the quality gate
pub const DEFAULT_MIN_SCORE: f64 = 0.8;
/// Per-component score below which an issue is raised
pub const DEFAULT_MIN_COMPONENT_SCORE: f64 = 0.7;

/// Build the step set for producing a video on the given topic.
pub fn production_steps(topic: &str, duration_secs: u32) -> Vec<Step> {
    vec![
        Step::new(
            RESEARCH_TRENDS,
            names::RESEARCHER_TRENDS,
            templates::research_request(topic, "trends"),
        ),
        Step::new(
            RESEARCH_FACTS,
            names::RESEARCHER_FACTS,
            templates::research_request(topic, "facts"),
        ),
        Step::new(
            RESEARCH_COMPETITION,
            names::RESEARCHER_COMPETITION,
            templates::research_request(topic, "competition"),
        ),
        Step::new(
            SCRIPT_WRITING,
            names::SCRIPT_WRITER,
            templates::script_request(topic, duration_secs),
        )
        .with_dependencies([RESEARCH_TRENDS, RESEARCH_FACTS, RESEARCH_COMPETITION]),
        Step::new(
            VOICEOVER_PRODUCTION,
            names::VOICE_SYNTHESIZER,
            templates::production_request("voiceover"),
        )
        .with_dependencies([SCRIPT_WRITING]),
        Step::new(
            VISUAL_PRODUCTION,
            names::VIDEO_EDITOR,
            templates::production_request("visuals"),
        )
        .with_dependencies([SCRIPT_WRITING]),
        Step::new(
            THUMBNAIL_CREATION,
            names::THUMBNAIL_GENERATOR,
            templates::production_request("thumbnail"),
        )
        .with_dependencies([SCRIPT_WRITING]),
        Step::new(
            QUALITY_VALIDATION,
            names::QUALITY_VALIDATOR,
            templates::quality_validation_request(DEFAULT_MIN_SCORE, DEFAULT_MIN_COMPONENT_SCORE),
        )
        .with_dependencies([VOICEOVER_PRODUCTION, VISUAL_PRODUCTION, THUMBNAIL_CREATION]),
        Step::new(
            FINAL_ASSEMBLY,
            names::VIDEO_ASSEMBLER,
            templates::assembly_request(topic),
        )
        .with_dependencies([QUALITY_VALIDATION]),
    ]
}

/// Pull the result of a dependency out of a dispatch payload's inputs.
pub fn dependency_input<'a>(content: &'a Value, step_id: &str) -> Option<&'a Value> {
    content.get("inputs").and_then(|inputs| inputs.get(step_id))
}
