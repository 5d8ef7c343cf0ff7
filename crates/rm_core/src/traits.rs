use async_trait::async_trait;

use crate::error::EnrichmentError;
use crate::types::{Article, RawArticle, Sentiment};
use crate::Result;

/// Searches a news provider for recent articles about a topic.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Raw article records for `topic`, looking back `window_days` days.
    /// Returns only the fields the search surface carries; full text comes
    /// from the enricher.
    async fn fetch(&self, topic: &str, window_days: u32) -> Result<Vec<RawArticle>>;
}

/// Resolves a fetched article into its full form: content, image, refined
/// publish date, continuous sentiment score and named entities.
#[async_trait]
pub trait ArticleEnricher: Send + Sync {
    async fn enrich(&self, raw: &RawArticle) -> std::result::Result<Article, EnrichmentError>;
}

/// Assigns a categorical sentiment label to article content with respect to
/// a topic.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, content: &str, topic: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Bounded-length summary of one article's content. The Not-related
    /// sentinel is a valid response and marks the article off-topic.
    async fn summarize(&self, content: &str, topic: &str) -> Result<String>;

    /// Up to three bullet points condensing a batch of joined summaries
    /// with the given polarity toward the topic.
    async fn bullet_points(
        &self,
        contents: &str,
        topic: &str,
        polarity: Sentiment,
    ) -> Result<String>;
}

/// Durable per-topic article table. A topic with no stored data loads as an
/// empty ledger, never an error.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self, topic: &str) -> Result<Vec<Article>>;

    /// Append rows to the topic's table.
    async fn append(&self, topic: &str, articles: &[Article]) -> Result<()>;

    /// Rewrite the topic's table wholesale. Only the annotation backfill may
    /// use this; existing rows never change otherwise.
    async fn replace(&self, topic: &str, articles: &[Article]) -> Result<()>;
}
