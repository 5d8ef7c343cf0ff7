use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use rm_core::{
    ArticleEnricher, ArticleFetcher, Result, Sentiment, SentimentClassifier, Summarizer,
    NOT_RELATED_SENTINEL,
};
use rm_storage::Ledger;

/// How many annotation calls may be in flight at once per topic.
const ANNOTATE_PARALLELISM: usize = 8;

/// Drives the per-topic pipeline: fetch and merge new articles, then
/// annotate the rows still missing a sentiment label or summary.
pub struct MonitorManager {
    ledger: Ledger,
    fetcher: Arc<dyn ArticleFetcher>,
    enricher: Arc<dyn ArticleEnricher>,
    classifier: Arc<dyn SentimentClassifier>,
    summarizer: Arc<dyn Summarizer>,
    semaphore: Arc<Semaphore>,
}

impl MonitorManager {
    pub fn new(
        ledger: Ledger,
        fetcher: Arc<dyn ArticleFetcher>,
        enricher: Arc<dyn ArticleEnricher>,
        classifier: Arc<dyn SentimentClassifier>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            ledger,
            fetcher,
            enricher,
            classifier,
            summarizer,
            semaphore: Arc::new(Semaphore::new(ANNOTATE_PARALLELISM)),
        }
    }

    /// Fetch recent articles for a topic and merge them into its ledger.
    /// Returns how many new rows were persisted.
    pub async fn refresh_topic(
        &self,
        topic: &str,
        window_days: u32,
        start_date: NaiveDate,
    ) -> Result<usize> {
        let candidates = self.fetcher.fetch(topic, window_days).await?;
        debug!(topic, candidates = candidates.len(), "fetched candidates");

        let accepted = self
            .ledger
            .merge_raw(topic, candidates, self.enricher.as_ref(), start_date)
            .await?;
        let marked = self.ledger.compute_relevance(topic, accepted);
        self.ledger.append(topic, &marked).await?;

        info!(topic, added = marked.len(), "topic refreshed");
        Ok(marked.len())
    }

    /// Annotate every row that still lacks a sentiment label or summary and
    /// has content to work from. A failed classification falls back to
    /// Neutral; a failed summarization records the Not-related sentinel so
    /// the row drops out of reporting instead of blocking the run.
    pub async fn annotate_topic(&self, topic: &str) -> Result<usize> {
        let pending: Vec<_> = self
            .ledger
            .rows(topic)
            .await?
            .into_iter()
            .filter(|row| {
                row.content.is_some()
                    && (row.text_sentiment.is_none() || row.summary.is_none())
            })
            .collect();
        debug!(topic, pending = pending.len(), "rows awaiting annotation");

        let mut tasks = Vec::with_capacity(pending.len());
        for row in pending {
            let topic = topic.to_string();
            let classifier = self.classifier.clone();
            let summarizer = self.summarizer.clone();
            let semaphore = self.semaphore.clone();
            let needs_sentiment = row.text_sentiment.is_none();
            let needs_summary = row.summary.is_none();
            let content = row.content.clone().unwrap_or_default();
            let title = row.title.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;

                let sentiment = if needs_sentiment {
                    match classifier.classify(&content, &topic).await {
                        Ok(label) => Some(label),
                        Err(e) => {
                            warn!(topic = %topic, title = %title, error = %e, "classification failed; labeling Neutral");
                            Some(Sentiment::Neutral)
                        }
                    }
                } else {
                    None
                };

                let summary = if needs_summary {
                    match summarizer.summarize(&content, &topic).await {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            warn!(topic = %topic, title = %title, error = %e, "summarization failed; recording sentinel");
                            Some(NOT_RELATED_SENTINEL.to_string())
                        }
                    }
                } else {
                    None
                };

                (title, sentiment, summary)
            }));
        }

        let mut annotated = 0;
        for task in tasks {
            let (title, sentiment, summary) = task
                .await
                .map_err(|e| rm_core::Error::External(e.into()))?;
            self.ledger
                .backfill_annotations(topic, &title, sentiment, summary)
                .await?;
            annotated += 1;
        }

        info!(topic, annotated, "topic annotated");
        Ok(annotated)
    }
}
