//! Final assembly worker - turns the validated assets into the deliverable.
//!
//! Converts the script scenes into an animated-slide plan, merges the
//! narration segments into one track descriptor, and emits the final video
//! descriptor under a slug derived from the topic.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bus::Worker;
use crate::domain::Message;
use crate::error::{ReelrError, Result};
use crate::scheduler::template;

/// Transition styles cycled across content slides
const TRANSITIONS: [&str; 3] = ["fade", "slide", "wipe"];

/// Assembles the final video from the quality-validated asset bundle.
pub struct AssemblyWorker {
    output_dir: PathBuf,
}

impl AssemblyWorker {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Title slide, one slide per content scene, takeaways slide.
    fn build_slides(&self, scenes: &[Value]) -> Vec<Value> {
        let mut slides = Vec::new();

        if let Some(title_scene) = scenes.iter().find(|s| s["type"] == "title") {
            slides.push(json!({
                "title": title_scene["title"],
                "content": [title_scene["subtitle"]],
                "duration_seconds": title_scene["duration_seconds"],
                "transition": "fade",
                "slide_number": 1
            }));
        }

        for (i, scene) in scenes.iter().filter(|s| s["type"] == "content").enumerate() {
            slides.push(json!({
                "title": scene["title"],
                "content": scene.get("key_points").cloned().unwrap_or_else(|| json!([scene["content"]])),
                "duration_seconds": scene["duration_seconds"],
                "transition": TRANSITIONS[i % TRANSITIONS.len()],
                "slide_number": slides.len() + 1
            }));
        }

        if let Some(conclusion) = scenes.iter().find(|s| s["type"] == "conclusion") {
            slides.push(json!({
                "title": "Key Takeaways",
                "content": [conclusion["content"]],
                "duration_seconds": conclusion["duration_seconds"],
                "transition": "fade",
                "slide_number": slides.len() + 1
            }));
        }

        let total = slides.len();
        for slide in &mut slides {
            slide["total_slides"] = json!(total);
        }

        slides
    }
}

#[async_trait]
impl Worker for AssemblyWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let report = template::dependency_input(&message.content, template::QUALITY_VALIDATION)
            .cloned()
            .ok_or_else(|| {
                ReelrError::HandlerFailure(format!(
                    "{} result missing from inputs",
                    template::QUALITY_VALIDATION
                ))
            })?;

        let topic = message
            .content
            .get("topic")
            .and_then(|t| t.as_str())
            .unwrap_or("video");
        let slug = slugify(topic);

        let assets = &report["assets"];
        let scenes = assets["visuals"]["scenes"].as_array().cloned().unwrap_or_default();
        let slides = self.build_slides(&scenes);

        let duration_seconds: u64 = slides
            .iter()
            .map(|slide| slide["duration_seconds"].as_u64().unwrap_or(0))
            .sum();
        let segment_count = assets["audio"]["segment_count"].as_u64().unwrap_or(0);

        tracing::info!(
            slug = %slug,
            slides = slides.len(),
            duration_seconds = duration_seconds,
            "Assembled final video"
        );

        Ok(json!({
            "video": {
                "file": self.output_dir.join(format!("{}.mp4", slug)).display().to_string(),
                "duration_seconds": duration_seconds,
                "slide_count": slides.len(),
                "fps": 30,
                "resolution": "1920x1080"
            },
            "audio_track": {
                "file": self.output_dir.join(format!("{}_narration.wav", slug)).display().to_string(),
                "segment_count": segment_count
            },
            "thumbnail": assets["thumbnail"]["thumbnail"].clone(),
            "slides": slides,
            "quality_score": report["final_score"],
            "meets_standards": report["meets_standards"]
        }))
    }
}

/// Lowercased, alphanumeric-and-dash file stem for a topic.
fn slugify(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut last_dash = true;

    for c in topic.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}
