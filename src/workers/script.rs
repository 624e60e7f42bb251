//! Script writer - turns topic and research into a polished video script.
//!
//! Three passes, as a human writer would work: outline, scene development,
//! polishing into the final script the production workers consume.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bus::Worker;
use crate::domain::Message;
use crate::error::Result;

/// Scene length for the title and conclusion bookends
const BOOKEND_SECONDS: u32 = 5;

/// Writes the video script from topic, duration, and research inputs.
pub struct ScriptWorker;

impl ScriptWorker {
    pub fn new() -> Self {
        Self
    }

    /// Outline with a hook, introduction, weighted main points, and
    /// conclusion. AI-flavored topics get tailored points; everything else
    /// gets the generic structure.
    fn create_outline(&self, topic: &str, duration_secs: u32) -> Value {
        let duration = duration_secs as f64;
        let topic_lower = topic.to_lowercase();

        if topic_lower.contains("ai")
            || topic_lower.contains("agent")
            || topic_lower.contains("automation")
        {
            json!({
                "hook": format!("AI Revolution: {}", topic),
                "introduction": format!(
                    "Explore {} and understand how artificial intelligence transforms industries.",
                    topic
                ),
                "main_points": [
                    {
                        "point": "What is AI and How Does It Work?",
                        "duration": (duration * 0.25).round() as u32,
                        "details": "AI systems learn from data and make intelligent decisions. They process information, identify patterns, and generate insights. Modern AI uses machine learning and neural networks to continuously improve."
                    },
                    {
                        "point": "Key Applications in Business",
                        "duration": (duration * 0.35).round() as u32,
                        "details": "AI powers automation, analytics, customer service, and content creation. Companies use AI to reduce costs, improve quality, and accelerate innovation. Real-world examples show measurable ROI."
                    },
                    {
                        "point": "Challenges and Future Outlook",
                        "duration": (duration * 0.25).round() as u32,
                        "details": "AI faces challenges around bias, interpretability, and ethics. Future developments will address these concerns. The AI industry continues to evolve with breakthrough innovations."
                    },
                    {
                        "point": "How You Can Get Started",
                        "duration": (duration * 0.15).round() as u32,
                        "details": "Learn AI fundamentals through online courses. Start with Python and machine learning libraries. Build projects that solve real problems. Join the AI community and stay updated."
                    }
                ],
                "conclusion": format!(
                    "{} is reshaping our world. Understanding these technologies positions you for future success.",
                    topic
                ),
                "topic": topic
            })
        } else {
            json!({
                "hook": format!("Essential Guide to {}", topic),
                "introduction": format!("This comprehensive video covers {} in detail.", topic),
                "main_points": [
                    {
                        "point": format!("Introduction to {}", topic),
                        "duration": (duration * 0.25).round() as u32,
                        "details": format!("Understand the fundamentals of {}. Learn key concepts and terminology.", topic)
                    },
                    {
                        "point": format!("Core Principles of {}", topic),
                        "duration": (duration * 0.35).round() as u32,
                        "details": format!("Explore the main principles and best practices for {}.", topic)
                    },
                    {
                        "point": "Practical Applications",
                        "duration": (duration * 0.25).round() as u32,
                        "details": format!("See real-world examples of {} in action.", topic)
                    },
                    {
                        "point": "Next Steps and Resources",
                        "duration": (duration * 0.15).round() as u32,
                        "details": format!("Learn how to apply {} in your own projects.", topic)
                    }
                ],
                "conclusion": format!("{} is an important skill for the modern world. Start learning today!", topic),
                "topic": topic
            })
        }
    }

    /// Title scene, one content scene per main point, conclusion scene.
    fn develop_scenes(&self, outline: &Value) -> Vec<Value> {
        let mut scenes = Vec::new();

        scenes.push(json!({
            "scene_number": 0,
            "type": "title",
            "title": outline["topic"],
            "subtitle": outline["hook"],
            "duration_seconds": BOOKEND_SECONDS,
            "content": format!("🎬 {}", outline["hook"].as_str().unwrap_or("")),
            "voiceover_text": outline["introduction"]
        }));

        let main_points = outline["main_points"].as_array().cloned().unwrap_or_default();
        for (i, point) in main_points.iter().enumerate() {
            let details = point["details"].as_str().unwrap_or("");
            scenes.push(json!({
                "scene_number": i + 1,
                "type": "content",
                "title": point["point"],
                "content": details,
                "duration_seconds": point["duration"].as_u64().unwrap_or(10),
                "voiceover_text": details,
                "key_points": extract_key_points(details)
            }));
        }

        scenes.push(json!({
            "scene_number": main_points.len() + 1,
            "type": "conclusion",
            "title": "Key Takeaways",
            "content": outline["conclusion"],
            "duration_seconds": BOOKEND_SECONDS,
            "voiceover_text": outline["conclusion"]
        }));

        scenes
    }

    /// Organize scenes into the final script the production workers consume.
    fn polish_script(&self, scenes: &[Value]) -> Value {
        let sections: Vec<Value> = scenes
            .iter()
            .filter(|scene| scene["type"] != "title")
            .map(|scene| {
                json!({
                    "heading": scene["title"],
                    "key_points": scene.get("key_points").cloned().unwrap_or_else(|| json!([scene["content"]])),
                    "duration_seconds": scene["duration_seconds"],
                    "voiceover": scene["voiceover_text"]
                })
            })
            .collect();

        let title_scene = scenes.iter().find(|s| s["type"] == "title");
        let conclusion_scene = scenes.iter().find(|s| s["type"] == "conclusion");

        json!({
            "title": title_scene.map(|s| s["title"].clone()).unwrap_or_else(|| json!("Video")),
            "tagline": title_scene.map(|s| s["subtitle"].clone()).unwrap_or_else(|| json!("")),
            "total_duration": total_duration(scenes),
            "sections": sections,
            "conclusion": conclusion_scene
                .map(|s| json!([s["content"]]))
                .unwrap_or_else(|| json!([])),
            "target_audience": "General audience",
            "style": "Educational and engaging"
        })
    }
}

impl Default for ScriptWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for ScriptWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let topic = message
            .content
            .get("topic")
            .and_then(|t| t.as_str())
            .unwrap_or("");
        let duration_secs = message
            .content
            .get("duration")
            .and_then(|d| d.as_u64())
            .unwrap_or(600) as u32;

        tracing::info!(topic = %topic, duration_secs = duration_secs, "Writing script");

        let outline = self.create_outline(topic, duration_secs);
        let scenes = self.develop_scenes(&outline);
        let final_script = self.polish_script(&scenes);
        let estimated_duration = total_duration(&scenes);

        Ok(json!({
            "outline": outline,
            "scenes": scenes,
            "final_script": final_script,
            "estimated_duration": estimated_duration
        }))
    }
}

/// First three sentences of the details, shortened when long.
fn extract_key_points(text: &str) -> Vec<String> {
    let mut key_points: Vec<String> = text
        .split(". ")
        .take(3)
        .map(str::trim)
        .filter(|sentence| sentence.len() > 10)
        .map(|sentence| {
            if sentence.len() > 100 {
                let short: String = sentence.chars().take(100).collect();
                format!("{}...", short)
            } else {
                sentence.to_string()
            }
        })
        .collect();

    if key_points.is_empty() {
        key_points.push(text.chars().take(100).collect());
    }

    key_points
}

fn total_duration(scenes: &[Value]) -> u64 {
    scenes
        .iter()
        .map(|scene| scene["duration_seconds"].as_u64().unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::templates;

    async fn write_script(topic: &str, duration: u32) -> Value {
        let worker = ScriptWorker::new();
        let message = Message::new(
            "tester",
            "script_writer",
            "execute_task",
            templates::script_request(topic, duration),
        );
        worker.handle(&message).await.unwrap()
    }

    #[tokio::test]
    async fn test_script_has_six_scenes() {
        let result = write_script("rust programming", 600).await;
        let scenes = result["scenes"].as_array().unwrap();
        // Title + 4 main points + conclusion
        assert_eq!(scenes.len(), 6);
        assert_eq!(scenes[0]["type"], "title");
        assert_eq!(scenes[5]["type"], "conclusion");
    }

    #[tokio::test]
    async fn test_generic_outline_mentions_topic() {
        let result = write_script("woodworking", 600).await;
        let outline = &result["outline"];
        assert!(outline["hook"].as_str().unwrap().contains("woodworking"));
        assert_eq!(outline["main_points"].as_array().unwrap().len(), 4);
        assert!(outline["conclusion"].as_str().unwrap().contains("woodworking"));
    }

    #[tokio::test]
    async fn test_ai_topic_gets_tailored_outline() {
        let result = write_script("AI agents in production", 600).await;
        let hook = result["outline"]["hook"].as_str().unwrap();
        assert!(hook.starts_with("AI Revolution"));
    }

    #[tokio::test]
    async fn test_point_durations_scale_with_target() {
        let result = write_script("woodworking", 400).await;
        let points = result["outline"]["main_points"].as_array().unwrap();
        assert_eq!(points[0]["duration"], 100); // 0.25 * 400
        assert_eq!(points[1]["duration"], 140); // 0.35 * 400
    }

    #[tokio::test]
    async fn test_final_script_sections_skip_title_scene() {
        let result = write_script("woodworking", 600).await;
        let script = &result["final_script"];
        // 4 content scenes + conclusion scene
        assert_eq!(script["sections"].as_array().unwrap().len(), 5);
        assert_eq!(script["title"], "woodworking");
        assert!(script["tagline"].as_str().unwrap().contains("woodworking"));
    }

    #[tokio::test]
    async fn test_estimated_duration_sums_scenes() {
        let result = write_script("woodworking", 400).await;
        let scenes = result["scenes"].as_array().unwrap();
        let sum: u64 = scenes.iter().map(|s| s["duration_seconds"].as_u64().unwrap()).sum();
        assert_eq!(result["estimated_duration"].as_u64().unwrap(), sum);
        // Bookends plus the weighted points
        assert_eq!(sum, 5 + 100 + 140 + 100 + 60 + 5);
    }

    #[test]
    fn test_extract_key_points_takes_first_sentences() {
        let text = "First sentence here. Second sentence here. Third sentence here. Fourth one.";
        let points = extract_key_points(text);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], "First sentence here");
    }

    #[test]
    fn test_extract_key_points_shortens_long_sentences() {
        let long = "x".repeat(150);
        let points = extract_key_points(&long);
        assert_eq!(points.len(), 1);
        assert!(points[0].ends_with("..."));
        assert_eq!(points[0].len(), 103);
    }

    #[test]
    fn test_extract_key_points_falls_back_on_short_text() {
        let points = extract_key_points("tiny");
        assert_eq!(points, vec!["tiny".to_string()]);
    }
}
