use async_trait::async_trait;

use rm_core::{Result, Sentiment, SentimentClassifier, Summarizer, NOT_RELATED_SENTINEL};

const POSITIVE_CUES: &[&str] = &[
    "gain", "growth", "profit", "record", "win", "success", "strong", "award", "expand",
];
const NEGATIVE_CUES: &[&str] = &[
    "loss", "lawsuit", "fraud", "decline", "scandal", "layoff", "weak", "fine", "breach",
];

/// Deterministic offline model: cue-word sentiment and leading-words
/// summaries. Used by tests and `--model dummy` runs.
#[derive(Debug, Clone, Copy)]
pub struct DummyModel;

fn count_cues(haystack: &str, cues: &[&str]) -> usize {
    cues.iter().filter(|cue| haystack.contains(*cue)).count()
}

#[async_trait]
impl SentimentClassifier for DummyModel {
    async fn classify(&self, content: &str, topic: &str) -> Result<Sentiment> {
        let lowered = content.to_lowercase();
        if !lowered.contains(&topic.to_lowercase()) {
            return Ok(Sentiment::NotRelated);
        }
        let positive = count_cues(&lowered, POSITIVE_CUES);
        let negative = count_cues(&lowered, NEGATIVE_CUES);
        Ok(if positive > negative {
            Sentiment::Positive
        } else if negative > positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        })
    }
}

#[async_trait]
impl Summarizer for DummyModel {
    async fn summarize(&self, content: &str, topic: &str) -> Result<String> {
        if !content.to_lowercase().contains(&topic.to_lowercase()) {
            return Ok(NOT_RELATED_SENTINEL.to_string());
        }
        let words: Vec<&str> = content.split_whitespace().take(50).collect();
        Ok(words.join(" "))
    }

    async fn bullet_points(
        &self,
        contents: &str,
        _topic: &str,
        _polarity: Sentiment,
    ) -> Result<String> {
        let bullets: Vec<String> = contents
            .split("----")
            .filter(|chunk| !chunk.trim().is_empty())
            .take(3)
            .map(|chunk| {
                let lead: Vec<&str> = chunk.split_whitespace().take(12).collect();
                format!("- {}", lead.join(" "))
            })
            .collect();
        Ok(bullets.join("\n"))
    }
}
