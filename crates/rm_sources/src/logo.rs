use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use rm_core::{Error, Result};

const SEARCH_URL: &str = "https://www.bing.com/images/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Downloads one logo image per topic from Bing image search. A logo already
/// on disk is never re-fetched.
pub struct LogoFetcher {
    client: Client,
    logos_dir: PathBuf,
}

impl LogoFetcher {
    pub fn new(logos_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            logos_dir: logos_dir.into(),
        })
    }

    pub fn logo_path(&self, topic: &str) -> PathBuf {
        self.logos_dir.join(format!("{topic}.png"))
    }

    /// Fetch and store a logo for the topic unless one is already present.
    /// Returns the on-disk path.
    pub async fn ensure_logo(&self, topic: &str) -> Result<PathBuf> {
        let path = self.logo_path(topic);
        if path.exists() {
            debug!(topic, "logo already downloaded");
            return Ok(path);
        }

        let query = format!("\"{topic}\" transparent logo");
        let html = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let image_url = first_image_url(&html)
            .ok_or_else(|| Error::Fetch(format!("no logo candidates found for {topic}")))?;

        let bytes = self
            .client
            .get(image_url.as_str())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(&self.logos_dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        info!(topic, path = %path.display(), "logo saved");
        Ok(path)
    }
}

/// Result tiles carry their metadata as a JSON blob in the `m` attribute of
/// `a.iusc` anchors; `murl` inside it is the full-size image URL.
fn first_image_url(html: &str) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.iusc").ok()?;
    for anchor in document.select(&selector) {
        let Some(meta) = anchor.value().attr("m") else {
            continue;
        };
        let Ok(meta) = serde_json::from_str::<serde_json::Value>(meta) else {
            continue;
        };
        if let Some(murl) = meta.get("murl").and_then(|v| v.as_str()) {
            if let Ok(url) = Url::parse(murl) {
                return Some(url);
            }
        }
    }
    None
}
