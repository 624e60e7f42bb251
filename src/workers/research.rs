//! Research workers - trends, facts, and competition research for a topic.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bus::Worker;
use crate::domain::Message;
use crate::error::Result;

/// Which angle a research worker covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchKind {
    Trends,
    Facts,
    Competition,
}

impl ResearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchKind::Trends => "trends",
            ResearchKind::Facts => "facts",
            ResearchKind::Competition => "competition",
        }
    }
}

/// Researches one angle of a topic.
pub struct ResearchWorker {
    kind: ResearchKind,
}

impl ResearchWorker {
    pub fn new(kind: ResearchKind) -> Self {
        Self { kind }
    }

    fn research_trends(&self, topic: &str) -> Value {
        json!({
            "research_type": "trends",
            "trending_angles": [
                format!("Latest developments in {}", topic),
                format!("Future of {}", topic),
                format!("Controversial aspects of {}", topic),
            ],
            "search_volume": "High",
            "competition_level": "Medium"
        })
    }

    fn research_facts(&self, topic: &str) -> Value {
        json!({
            "research_type": "facts",
            "key_facts": [
                format!("Fact 1 about {}", topic),
                format!("Fact 2 about {}", topic),
                format!("Fact 3 about {}", topic),
            ],
            "sources": ["Source A", "Source B", "Source C"],
            "statistics": { "relevance_score": 0.85 }
        })
    }

    fn research_competition(&self, topic: &str) -> Value {
        json!({
            "research_type": "competition",
            "top_videos": [
                { "title": format!("Video 1 about {}", topic), "views": "100K" },
                { "title": format!("Video 2 about {}", topic), "views": "150K" },
                { "title": format!("Video 3 about {}", topic), "views": "80K" },
            ],
            "gaps_identified": ["Missing practical examples", "No recent updates"],
            "success_factors": ["Good storytelling", "Clear explanations"]
        })
    }
}

#[async_trait]
impl Worker for ResearchWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        let topic = message
            .content
            .get("topic")
            .and_then(|t| t.as_str())
            .unwrap_or("");

        tracing::info!(kind = self.kind.as_str(), topic = %topic, "Researching");

        let result = match self.kind {
            ResearchKind::Trends => self.research_trends(topic),
            ResearchKind::Facts => self.research_facts(topic),
            ResearchKind::Competition => self.research_competition(topic),
        };

        Ok(result)
    }
}
