use std::path::Path;

use rm_core::{Error, Result};
use rm_inference::FewShotExample;

/// Runtime configuration: the topic list from disk, API keys from the
/// environment, optional few-shot examples from a JSON file.
#[derive(Debug, Default)]
pub struct Config {
    pub topics: Vec<String>,
    pub world_news_api_keys: Vec<String>,
    pub gemini_api_key: Option<String>,
    pub few_shots: Vec<FewShotExample>,
}

impl Config {
    pub fn load(topics_path: &Path, few_shots_path: Option<&Path>) -> Result<Self> {
        let topics = read_topics(topics_path)?;
        let world_news_api_keys = std::env::var("WORLD_NEWS_API_KEYS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let few_shots = match few_shots_path {
            Some(path) => read_few_shots(path)?,
            None => Vec::new(),
        };
        Ok(Self {
            topics,
            world_news_api_keys,
            gemini_api_key,
            few_shots,
        })
    }
}

/// One topic per line; blank lines and surrounding whitespace are ignored.
/// An unreadable or empty file is a configuration error.
fn read_topics(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("cannot read topics file {}: {e}", path.display()))
    })?;
    let topics: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if topics.is_empty() {
        return Err(Error::Configuration(format!(
            "topics file {} contains no topics",
            path.display()
        )));
    }
    Ok(topics)
}

fn read_few_shots(path: &Path) -> Result<Vec<FewShotExample>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!(
            "cannot read few-shot file {}: {e}",
            path.display()
        ))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        Error::Configuration(format!(
            "few-shot file {} is not valid JSON: {e}",
            path.display()
        ))
    })
}
