use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use rm_core::{Article, ArticleEnricher, LedgerStore, RawArticle, Result, Sentiment};

/// How many enrichment calls may be in flight at once during a merge.
const ENRICH_PARALLELISM: usize = 8;

/// One durable, deduplicated article collection per topic. Every pipeline
/// stage reads and mutates topic state through this type only; existing rows
/// are never edited in place except to backfill absent annotations.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// All rows persisted for a topic, unfiltered, in insertion order.
    pub async fn rows(&self, topic: &str) -> Result<Vec<Article>> {
        self.store.load(topic).await
    }

    /// Titles already persisted for a topic. Pure read; a topic with no
    /// ledger yet yields an empty set.
    pub async fn existing_titles(&self, topic: &str) -> Result<HashSet<String>> {
        Ok(self
            .store
            .load(topic)
            .await?
            .into_iter()
            .map(|a| a.title)
            .collect())
    }

    /// Merge freshly fetched candidates: titles the ledger already holds are
    /// dropped before enrichment (enrichment is expensive and must not
    /// repeat), the rest are enriched, and only articles whose refined
    /// publish date is on or after `start_date` survive. An enrichment
    /// failure drops that one candidate and the merge continues.
    ///
    /// Returns the accepted, fully enriched articles in enrichment
    /// completion order. Nothing is persisted here; callers follow up with
    /// [`Ledger::compute_relevance`] and [`Ledger::append`].
    pub async fn merge_raw(
        &self,
        topic: &str,
        candidates: Vec<RawArticle>,
        enricher: &dyn ArticleEnricher,
        start_date: NaiveDate,
    ) -> Result<Vec<Article>> {
        let known = self.existing_titles(topic).await?;
        let fresh: Vec<RawArticle> = candidates
            .into_iter()
            .filter(|c| !known.contains(&c.title))
            .collect();
        debug!(
            topic,
            fresh = fresh.len(),
            known = known.len(),
            "merging fetched candidates"
        );

        let accepted: Vec<Article> = stream::iter(fresh)
            .map(|raw| async move {
                let article = match enricher.enrich(&raw).await {
                    Ok(article) => article,
                    Err(e) => {
                        warn!(topic, title = %raw.title, error = %e, "enrichment failed; skipping article");
                        return None;
                    }
                };
                match article.publish_date {
                    Some(date) if date >= start_date => Some(article),
                    Some(date) => {
                        debug!(topic, title = %article.title, %date, "publish date before cutoff; discarding");
                        None
                    }
                    None => {
                        warn!(topic, title = %article.title, "enriched article has no publish date; discarding");
                        None
                    }
                }
            })
            .buffer_unordered(ENRICH_PARALLELISM)
            .filter_map(|article| async move { article })
            .collect()
            .await;

        Ok(accepted)
    }

    /// Mark each article relevant iff the topic occurs in its content,
    /// case-insensitive. Non-relevant rows still get persisted for
    /// historical completeness; they are excluded from every
    /// relevance-filtered view.
    pub fn compute_relevance(&self, topic: &str, mut articles: Vec<Article>) -> Vec<Article> {
        let needle = topic.to_lowercase();
        for article in &mut articles {
            article.is_relevant = article
                .content
                .as_deref()
                .map_or(false, |c| c.to_lowercase().contains(&needle));
        }
        articles
    }

    /// Persist enriched, relevance-marked articles by appending to the
    /// topic's table.
    pub async fn append(&self, topic: &str, articles: &[Article]) -> Result<()> {
        if articles.is_empty() {
            return Ok(());
        }
        self.store.append(topic, articles).await
    }

    /// Set sentiment and/or summary on the row with the given title, but
    /// only where the field is still absent. This keeps the annotation
    /// stage re-runnable without reprocessing finished rows.
    pub async fn backfill_annotations(
        &self,
        topic: &str,
        title: &str,
        sentiment: Option<Sentiment>,
        summary: Option<String>,
    ) -> Result<()> {
        let mut rows = self.store.load(topic).await?;
        let mut changed = false;
        if let Some(row) = rows.iter_mut().find(|r| r.title == title) {
            if row.text_sentiment.is_none() {
                if let Some(s) = sentiment {
                    row.text_sentiment = Some(s);
                    changed = true;
                }
            }
            if row.summary.is_none() {
                if let Some(s) = summary {
                    row.summary = Some(s);
                    changed = true;
                }
            }
        }
        if changed {
            self.store.replace(topic, &rows).await?;
        }
        Ok(())
    }

    /// Reportable rows: relevant, summarized, summary not the Not-related
    /// sentinel. Most recent publish date first; ties keep insertion order.
    pub async fn relevant_view(&self, topic: &str) -> Result<Vec<Article>> {
        let mut rows: Vec<Article> = self
            .store
            .load(topic)
            .await?
            .into_iter()
            .filter(Article::is_reportable)
            .collect();
        rows.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(rows)
    }
}
