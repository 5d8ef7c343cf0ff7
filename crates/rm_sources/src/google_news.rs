use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use tracing::{debug, warn};

use rm_core::{ArticleFetcher, Error, RawArticle, Result};

const BASE_URL: &str = "https://news.google.com/rss/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Topic search over the Google News RSS feed. The feed reports title,
/// link, source and a coarse publication date; everything else comes from
/// the enricher later.
pub struct GoogleNewsFetcher {
    client: Client,
}

impl GoogleNewsFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn search_url(topic: &str, window_days: u32) -> String {
        let query = format!("\"{topic}\" when:{window_days}d");
        format!(
            "{BASE_URL}?q={}&hl=en&gl=US&ceid=US:en",
            urlencoding::encode(&query)
        )
    }

    fn parse_item(item: &rss::Item) -> Option<RawArticle> {
        let title = item.title()?.to_string();
        let url = item.link()?.to_string();
        let (title, publisher) = split_publisher(&title);
        let published_date = item
            .pub_date()
            .and_then(parse_rfc2822_date)
            .unwrap_or_else(|| Utc::now().date_naive());
        let description = item
            .description()
            .map(strip_html)
            .unwrap_or_default();
        Some(RawArticle {
            title,
            description,
            published_date,
            url,
            publisher,
        })
    }
}

/// Google News titles come as "Headline - Publisher". Split on the last
/// separator so headlines containing dashes stay intact.
fn split_publisher(raw_title: &str) -> (String, String) {
    match raw_title.rfind(" - ") {
        Some(pos) => (
            raw_title[..pos].trim().to_string(),
            raw_title[pos + 3..].trim().to_string(),
        ),
        None => (raw_title.trim().to_string(), String::new()),
    }
}

fn parse_rfc2822_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Feed descriptions embed anchor markup; drop the tags, keep the text.
fn strip_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[async_trait]
impl ArticleFetcher for GoogleNewsFetcher {
    async fn fetch(&self, topic: &str, window_days: u32) -> Result<Vec<RawArticle>> {
        let url = Self::search_url(topic, window_days);
        debug!(topic, %url, "querying news feed");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "news feed returned {} for {topic}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let channel = rss::Channel::read_from(&body[..])
            .map_err(|e| Error::Fetch(format!("unreadable feed for {topic}: {e}")))?;

        let mut articles = Vec::with_capacity(channel.items().len());
        for item in channel.items() {
            match Self::parse_item(item) {
                Some(article) => articles.push(article),
                None => warn!(topic, "feed item missing title or link; skipping"),
            }
        }
        debug!(topic, count = articles.len(), "feed items parsed");
        Ok(articles)
    }
}
