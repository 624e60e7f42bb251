//! Production workers - the external collaborators the core dispatches to.
//!
//! Each worker is a deterministic, stateless unit of work registered on the
//! bus once at startup. Real media synthesis stays external; these workers
//! produce structured descriptors, not bytes.

pub mod assembly;
pub mod media;
pub mod quality;
pub mod research;
pub mod script;

use std::sync::Arc;

use crate::bus::MessageBus;
use crate::config::Config;

pub use assembly::AssemblyWorker;
pub use media::{ThumbnailWorker, VisualWorker, VoiceWorker};
pub use quality::{HeuristicAssessor, HeuristicImprover, QualityWorker};
pub use research::{ResearchKind, ResearchWorker};
pub use script::ScriptWorker;

/// Canonical worker names the production template dispatches to.
pub mod names {
    pub const RESEARCHER_TRENDS: &str = "researcher_trends";
    pub const RESEARCHER_FACTS: &str = "researcher_facts";
    pub const RESEARCHER_COMPETITION: &str = "researcher_competition";
    pub const SCRIPT_WRITER: &str = "script_writer";
    pub const VOICE_SYNTHESIZER: &str = "voice_synthesizer";
    pub const VIDEO_EDITOR: &str = "video_editor";
    pub const THUMBNAIL_GENERATOR: &str = "thumbnail_generator";
    pub const QUALITY_VALIDATOR: &str = "quality_validator";
    pub const VIDEO_ASSEMBLER: &str = "video_assembler";
}

/// Register the full production team on a bus.
pub fn register_production_workers(bus: &MessageBus, config: &Config) {
    bus.register(names::RESEARCHER_TRENDS, Arc::new(ResearchWorker::new(ResearchKind::Trends)));
    bus.register(names::RESEARCHER_FACTS, Arc::new(ResearchWorker::new(ResearchKind::Facts)));
    bus.register(
        names::RESEARCHER_COMPETITION,
        Arc::new(ResearchWorker::new(ResearchKind::Competition)),
    );
    bus.register(names::SCRIPT_WRITER, Arc::new(ScriptWorker::new()));
    bus.register(
        names::VOICE_SYNTHESIZER,
        Arc::new(VoiceWorker::new(&config.production.output_dir)),
    );
    bus.register(
        names::VIDEO_EDITOR,
        Arc::new(VisualWorker::new(&config.production.output_dir)),
    );
    bus.register(
        names::THUMBNAIL_GENERATOR,
        Arc::new(ThumbnailWorker::new(&config.production.output_dir)),
    );
    bus.register(
        names::QUALITY_VALIDATOR,
        Arc::new(QualityWorker::new(
            config.quality.clone(),
            config.production.min_component_score,
        )),
    );
    bus.register(
        names::VIDEO_ASSEMBLER,
        Arc::new(AssemblyWorker::new(&config.production.output_dir)),
    );
}
