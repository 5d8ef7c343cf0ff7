use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use rm_core::{Article, ArticleEnricher, EnrichmentError, Error, RawArticle, Result};

const BASE_URL: &str = "https://api.worldnewsapi.com/extract-news";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    publish_date: Option<String>,
    #[serde(default)]
    sentiment: Option<f64>,
    #[serde(default)]
    entities: Vec<ExtractedEntity>,
}

#[derive(Debug, Deserialize)]
struct ExtractedEntity {
    name: String,
}

/// Full-text extraction via the worldnewsapi `extract-news` endpoint with
/// analysis enabled. Requests rotate round-robin through the configured API
/// keys to spread quota.
pub struct WorldNewsEnricher {
    client: Client,
    api_keys: Vec<String>,
    next_key: AtomicUsize,
}

impl WorldNewsEnricher {
    pub fn new(api_keys: Vec<String>) -> Result<Self> {
        if api_keys.is_empty() {
            return Err(Error::Configuration(
                "enrichment requires at least one worldnewsapi key".to_string(),
            ));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_keys,
            next_key: AtomicUsize::new(0),
        })
    }

    fn next_key(&self) -> &str {
        let idx = self.next_key.fetch_add(1, Ordering::Relaxed);
        &self.api_keys[idx % self.api_keys.len()]
    }
}

/// The API reports `publish_date` as `YYYY-MM-DD HH:MM:SS`, occasionally with
/// a nonstandard tail; the leading date prefix is accepted as a fallback.
fn parse_publish_date(raw: &str) -> std::result::Result<NaiveDate, EnrichmentError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| EnrichmentError::UnparseableDate(raw.to_string()))
}

fn build_article(
    raw: &RawArticle,
    response: ExtractResponse,
) -> std::result::Result<Article, EnrichmentError> {
    let text = response.text.ok_or(EnrichmentError::MissingField("text"))?;
    let sentiment = response
        .sentiment
        .ok_or(EnrichmentError::MissingField("sentiment"))?;
    let publish_date = response
        .publish_date
        .ok_or(EnrichmentError::MissingField("publish_date"))?;
    let publish_date = parse_publish_date(&publish_date)?;

    let mut article = Article::from_raw(raw.clone());
    article.content = Some(text);
    article.image_url = response.image;
    article.publish_date = Some(publish_date);
    article.default_sentiment = Some(sentiment);
    article.entities = Some(response.entities.into_iter().map(|e| e.name).collect());
    Ok(article)
}

#[async_trait]
impl ArticleEnricher for WorldNewsEnricher {
    async fn enrich(&self, raw: &RawArticle) -> std::result::Result<Article, EnrichmentError> {
        debug!(title = %raw.title, "extracting article text");
        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("analyze", "true"),
                ("url", raw.url.as_str()),
                ("api-key", self.next_key()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichmentError::Timeout(raw.url.clone())
                } else {
                    EnrichmentError::Request(e.to_string())
                }
            })?;

        let extracted: ExtractResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;
        build_article(raw, extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawArticle {
        RawArticle {
            title: "Acme expands".to_string(),
            description: String::new(),
            published_date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
            url: "https://example.com/acme".to_string(),
            publisher: "Example".to_string(),
        }
    }

    #[test]
    fn publish_dates_parse_with_and_without_time() {
        assert_eq!(
            parse_publish_date("2024-05-14 09:30:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
        );
        assert_eq!(
            parse_publish_date("2024-05-14T09:30:00+02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
        );
        assert!(matches!(
            parse_publish_date("yesterday"),
            Err(EnrichmentError::UnparseableDate(_))
        ));
    }

    #[test]
    fn full_responses_populate_every_enrichment_field() {
        let payload = r#"{
            "text": "Acme Corp expands into Europe.",
            "image": "https://example.com/acme.jpg",
            "publish_date": "2024-05-14 09:30:00",
            "sentiment": 0.42,
            "entities": [{"name": "Acme Corp"}, {"name": "Europe"}]
        }"#;
        let response: ExtractResponse = serde_json::from_str(payload).unwrap();
        let article = build_article(&raw(), response).unwrap();

        assert_eq!(article.content.as_deref(), Some("Acme Corp expands into Europe."));
        assert_eq!(article.image_url.as_deref(), Some("https://example.com/acme.jpg"));
        assert_eq!(article.publish_date, NaiveDate::from_ymd_opt(2024, 5, 14));
        assert_eq!(article.default_sentiment, Some(0.42));
        let entities = article.entities.unwrap();
        assert!(entities.contains("Acme Corp") && entities.contains("Europe"));
    }

    #[test]
    fn missing_analysis_fields_fail_enrichment() {
        let payload = r#"{"text": "Acme Corp expands.", "publish_date": "2024-05-14 09:30:00"}"#;
        let response: ExtractResponse = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            build_article(&raw(), response),
            Err(EnrichmentError::MissingField("sentiment"))
        ));

        let payload = r#"{"sentiment": 0.1, "publish_date": "2024-05-14 09:30:00"}"#;
        let response: ExtractResponse = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            build_article(&raw(), response),
            Err(EnrichmentError::MissingField("text"))
        ));
    }

    #[test]
    fn keys_rotate_round_robin() {
        let enricher =
            WorldNewsEnricher::new(vec!["k1".to_string(), "k2".to_string()]).unwrap();
        assert_eq!(enricher.next_key(), "k1");
        assert_eq!(enricher.next_key(), "k2");
        assert_eq!(enricher.next_key(), "k1");
    }

    #[test]
    fn an_empty_key_list_is_a_configuration_error() {
        assert!(matches!(
            WorldNewsEnricher::new(Vec::new()),
            Err(Error::Configuration(_))
        ));
    }
}
