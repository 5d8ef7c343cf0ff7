use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use rm_core::{AggregateBullet, Article, Result, Sentiment, Summarizer, Timeframe};
use rm_storage::Ledger;

/// Separator between article summaries inside a bullet prompt.
const SUMMARY_SEPARATOR: &str = "----";

/// Builds the per-topic, per-timeframe bullet report from the ledger's
/// relevant view. Stateless: the output depends only on ledger contents and
/// the run date, and each run replaces the previous table wholesale.
pub struct PeriodAggregator {
    ledger: Ledger,
    summarizer: Arc<dyn Summarizer>,
}

impl PeriodAggregator {
    pub fn new(ledger: Ledger, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { ledger, summarizer }
    }

    /// Reportable rows strictly newer than `window_start`, split into
    /// positive and negative sets. Neutral and Not-related rows inform no
    /// bullet narrative and land in neither.
    pub async fn partition(
        &self,
        topic: &str,
        window_start: NaiveDate,
    ) -> Result<(Vec<Article>, Vec<Article>)> {
        let rows = self.ledger.relevant_view(topic).await?;
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for row in rows {
            if row.publish_date.map_or(true, |d| d <= window_start) {
                continue;
            }
            match row.text_sentiment {
                Some(Sentiment::Positive) => positive.push(row),
                Some(Sentiment::Negative) => negative.push(row),
                _ => {}
            }
        }
        Ok((positive, negative))
    }

    /// Condense one partition into up to three bullet points. An empty
    /// partition yields an empty string and never reaches the summarizer.
    pub async fn summarize_partition(
        &self,
        topic: &str,
        partition: &[Article],
        polarity: Sentiment,
    ) -> Result<String> {
        if partition.is_empty() {
            return Ok(String::new());
        }
        let contents = partition
            .iter()
            .filter_map(|a| a.summary.as_deref())
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR);
        self.summarizer.bullet_points(&contents, topic, polarity).await
    }

    /// One bullet row per topic and timeframe, windows anchored at today's
    /// date. Re-running on a later date shifts every window forward.
    pub async fn aggregate_all(&self, topics: &[String]) -> Result<Vec<AggregateBullet>> {
        self.aggregate_all_at(topics, Utc::now().date_naive()).await
    }

    pub async fn aggregate_all_at(
        &self,
        topics: &[String],
        today: NaiveDate,
    ) -> Result<Vec<AggregateBullet>> {
        let mut table = Vec::with_capacity(topics.len() * Timeframe::ALL.len());
        for topic in topics {
            for timeframe in Timeframe::ALL {
                let window_start = timeframe.window_start(today);
                let (positive, negative) = self.partition(topic, window_start).await?;
                debug!(
                    topic = %topic,
                    %timeframe,
                    positive = positive.len(),
                    negative = negative.len(),
                    "partitioned reportable rows"
                );
                let positive = self
                    .summarize_partition(topic, &positive, Sentiment::Positive)
                    .await?;
                let negative = self
                    .summarize_partition(topic, &negative, Sentiment::Negative)
                    .await?;
                table.push(AggregateBullet {
                    topic: topic.clone(),
                    timeframe,
                    positive,
                    negative,
                });
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rm_core::{LedgerStore, RawArticle};
    use rm_storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reportable(
        title: &str,
        publish_date: NaiveDate,
        sentiment: Sentiment,
        summary: &str,
    ) -> Article {
        let mut article = Article::from_raw(RawArticle {
            title: title.to_string(),
            description: String::new(),
            published_date: publish_date,
            url: format!("https://example.com/{title}"),
            publisher: "Example".to_string(),
        });
        article.publish_date = Some(publish_date);
        article.is_relevant = true;
        article.text_sentiment = Some(sentiment);
        article.summary = Some(summary.to_string());
        article
    }

    /// Joins bullet inputs verbatim and counts invocations so tests can
    /// assert empty partitions never reach the summarizer.
    #[derive(Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    impl CountingSummarizer {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        async fn summarize(&self, content: &str, _topic: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(content.to_string())
        }

        async fn bullet_points(
            &self,
            contents: &str,
            _topic: &str,
            polarity: Sentiment,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{polarity}: {contents}"))
        }
    }

    async fn aggregator_with(
        rows: Vec<Article>,
    ) -> (PeriodAggregator, Arc<CountingSummarizer>) {
        let store = Arc::new(MemoryStore::new());
        store.append("Acme Corp", &rows).await.unwrap();
        let summarizer = Arc::new(CountingSummarizer::default());
        (
            PeriodAggregator::new(Ledger::new(store), summarizer.clone()),
            summarizer,
        )
    }

    #[tokio::test]
    async fn empty_partition_yields_empty_string_without_a_call() {
        let (aggregator, summarizer) = aggregator_with(Vec::new()).await;
        let result = aggregator
            .summarize_partition("Acme Corp", &[], Sentiment::Positive)
            .await
            .unwrap();
        assert_eq!(result, "");
        assert_eq!(summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn weekly_window_boundary_is_strict() {
        let today = date(2024, 5, 15);
        let rows = vec![
            reportable("inside", today - chrono::Duration::days(6), Sentiment::Positive, "in"),
            reportable("outside", today - chrono::Duration::days(8), Sentiment::Positive, "out"),
            reportable("boundary", today - chrono::Duration::days(7), Sentiment::Positive, "edge"),
        ];
        let (aggregator, _) = aggregator_with(rows).await;

        let (positive, negative) = aggregator
            .partition("Acme Corp", Timeframe::Weekly.window_start(today))
            .await
            .unwrap();
        let titles: Vec<_> = positive.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["inside"]);
        assert!(negative.is_empty());
    }

    #[tokio::test]
    async fn neutral_and_not_related_rows_inform_no_partition() {
        let today = date(2024, 5, 15);
        let rows = vec![
            reportable("pos", today, Sentiment::Positive, "good"),
            reportable("neg", today, Sentiment::Negative, "bad"),
            reportable("meh", today, Sentiment::Neutral, "meh"),
            reportable("off", today, Sentiment::NotRelated, "off"),
        ];
        let (aggregator, _) = aggregator_with(rows).await;

        let (positive, negative) = aggregator
            .partition("Acme Corp", Timeframe::Weekly.window_start(today))
            .await
            .unwrap();
        assert_eq!(positive.len(), 1);
        assert_eq!(negative.len(), 1);
    }

    #[tokio::test]
    async fn aggregate_all_emits_one_row_per_topic_and_timeframe() {
        let today = date(2024, 5, 15);
        let rows = vec![
            reportable("a", today, Sentiment::Positive, "Acme Corp did well"),
            reportable("b", today, Sentiment::Negative, "Acme Corp struggled"),
        ];
        let (aggregator, summarizer) = aggregator_with(rows).await;

        let table = aggregator
            .aggregate_all_at(&["Acme Corp".to_string()], today)
            .await
            .unwrap();
        assert_eq!(table.len(), 3);

        let weekly = table
            .iter()
            .find(|row| row.timeframe == Timeframe::Weekly)
            .unwrap();
        assert!(weekly.positive.contains("Acme Corp did well"));
        assert!(weekly.negative.contains("Acme Corp struggled"));
        // Two partitions per timeframe, none empty.
        assert_eq!(summarizer.calls(), 6);
    }

    #[tokio::test]
    async fn summaries_join_with_the_separator() {
        let today = date(2024, 5, 15);
        let rows = vec![
            reportable("a", today, Sentiment::Positive, "first"),
            reportable("b", today, Sentiment::Positive, "second"),
        ];
        let (aggregator, _) = aggregator_with(rows).await;

        let (positive, _) = aggregator
            .partition("Acme Corp", Timeframe::Weekly.window_start(today))
            .await
            .unwrap();
        let bullets = aggregator
            .summarize_partition("Acme Corp", &positive, Sentiment::Positive)
            .await
            .unwrap();
        assert!(bullets.contains("first----second") || bullets.contains("second----first"));
    }
}
