//! Media production workers - voice synthesis, visual rendering, thumbnails.
//!
//! All three consume the script step's result from their dispatch inputs and
//! return descriptors pointing at where a real synthesis backend would leave
//! its output.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bus::Worker;
use crate::domain::Message;
use crate::error::{ReelrError, Result};
use crate::scheduler::template;

/// Transition styles cycled across scenes
const TRANSITIONS: [&str; 3] = ["fade", "slide", "wipe"];

fn script_input(message: &Message) -> Result<Value> {
    template::dependency_input(&message.content, template::SCRIPT_WRITING)
        .cloned()
        .ok_or_else(|| {
            ReelrError::HandlerFailure(format!(
                "{} result missing from inputs",
                template::SCRIPT_WRITING
            ))
        })
}

fn scenes_of(script_result: &Value) -> Vec<Value> {
    script_result["scenes"].as_array().cloned().unwrap_or_default()
}

/// Synthesizes narration segments from scene voiceover text.
pub struct VoiceWorker {
    output_dir: PathBuf,
}

impl VoiceWorker {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Worker for VoiceWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let script_result = script_input(message)?;
        let scenes = scenes_of(&script_result);

        let segments: Vec<Value> = scenes
            .iter()
            .filter(|scene| {
                scene["voiceover_text"]
                    .as_str()
                    .map(|text| !text.is_empty())
                    .unwrap_or(false)
            })
            .map(|scene| {
                let number = scene["scene_number"].as_u64().unwrap_or(0);
                json!({
                    "scene_number": number,
                    "file": self
                        .output_dir
                        .join("audio")
                        .join(format!("segment_{}.wav", number))
                        .display()
                        .to_string(),
                    "duration_seconds": scene["duration_seconds"],
                    "text": scene["voiceover_text"]
                })
            })
            .collect();

        let segment_count = segments.len();
        tracing::info!(segments = segment_count, "Synthesized narration");

        Ok(json!({
            "segments": segments,
            "segment_count": segment_count,
            "format": "wav",
            "voice": "narrator"
        }))
    }
}

/// Renders scene clips from the script.
pub struct VisualWorker {
    output_dir: PathBuf,
}

impl VisualWorker {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Worker for VisualWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let script_result = script_input(message)?;
        let scenes = scenes_of(&script_result);

        let clips: Vec<Value> = scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let number = scene["scene_number"].as_u64().unwrap_or(i as u64);
                json!({
                    "scene_number": number,
                    "title": scene["title"],
                    "file": self
                        .output_dir
                        .join("clips")
                        .join(format!("scene_{}.mp4", number))
                        .display()
                        .to_string(),
                    "duration_seconds": scene["duration_seconds"],
                    "transition": TRANSITIONS[i % TRANSITIONS.len()]
                })
            })
            .collect();

        tracing::info!(clips = clips.len(), "Rendered scene clips");

        Ok(json!({
            "clips": clips,
            "scene_count": scenes.len(),
            "resolution": "1920x1080",
            "fps": 30,
            // Echoed for the assembly step, which has no direct script input
            "scenes": scenes
        }))
    }
}

/// Generates the video thumbnail from the script title.
pub struct ThumbnailWorker {
    output_dir: PathBuf,
}

impl ThumbnailWorker {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Worker for ThumbnailWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let script_result = script_input(message)?;
        let title = script_result["final_script"]["title"]
            .as_str()
            .unwrap_or("Video Title")
            .to_string();

        tracing::info!(title = %title, "Generated thumbnail");

        Ok(json!({
            "thumbnail": {
                "title": title,
                "file": self.output_dir.join("thumbnail.png").display().to_string(),
                "width": 1280,
                "height": 720
            }
        }))
    }
}
