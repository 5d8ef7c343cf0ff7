use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use rm_core::{Error, Result, Sentiment, SentimentClassifier, Summarizer};

use crate::prompts::{self, FewShotExample};

const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Gemini chat model serving both annotation roles, at temperature 0 so
/// labels stay stable across runs.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    base_url: String,
    few_shots: Vec<FewShotExample>,
}

impl GeminiModel {
    pub fn new(api_key: String, few_shots: Vec<FewShotExample>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            few_shots,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                top_p: 1.0,
            },
        };

        let response = self
            .client
            .post(format!("{}:generateContent?key={}", self.base_url, self.api_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .ok_or_else(|| Error::External(anyhow::anyhow!("model returned no candidates")))
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("few_shots", &self.few_shots.len())
            .finish()
    }
}

#[async_trait]
impl SentimentClassifier for GeminiModel {
    async fn classify(&self, content: &str, topic: &str) -> Result<Sentiment> {
        let raw = self
            .generate(prompts::sentiment_prompt(content, topic, &self.few_shots))
            .await
            .map_err(|e| Error::Classification(e.to_string()))?;
        Sentiment::parse_lenient(&raw)
            .ok_or_else(|| Error::Classification(format!("unrecognized label: {raw}")))
    }
}

#[async_trait]
impl Summarizer for GeminiModel {
    async fn summarize(&self, content: &str, topic: &str) -> Result<String> {
        self.generate(prompts::summary_prompt(content, topic))
            .await
            .map_err(|e| Error::Summarization(e.to_string()))
    }

    async fn bullet_points(
        &self,
        contents: &str,
        topic: &str,
        polarity: Sentiment,
    ) -> Result<String> {
        self.generate(prompts::bullet_prompt(contents, topic, polarity))
            .await
            .map_err(|e| Error::Summarization(e.to_string()))
    }
}
