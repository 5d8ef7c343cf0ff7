use std::collections::HashMap;

use async_trait::async_trait;
use rm_core::{Article, LedgerStore, Result};
use tokio::sync::RwLock;

/// In-memory ledger store for tests and dry runs. State does not survive
/// the process.
#[derive(Default)]
pub struct MemoryStore {
    topics: RwLock<HashMap<String, Vec<Article>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self, topic: &str) -> Result<Vec<Article>> {
        Ok(self
            .topics
            .read()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, topic: &str, articles: &[Article]) -> Result<()> {
        self.topics
            .write()
            .await
            .entry(topic.to_string())
            .or_default()
            .extend_from_slice(articles);
        Ok(())
    }

    async fn replace(&self, topic: &str, articles: &[Article]) -> Result<()> {
        self.topics
            .write()
            .await
            .insert(topic.to_string(), articles.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rm_core::RawArticle;

    fn article(title: &str) -> Article {
        Article::from_raw(RawArticle {
            title: title.to_string(),
            description: String::new(),
            published_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            url: format!("https://example.com/{title}"),
            publisher: "Example".to_string(),
        })
    }

    #[tokio::test]
    async fn unknown_topic_loads_empty() {
        let store = MemoryStore::new();
        assert!(store.load("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_accumulates_per_topic() {
        let store = MemoryStore::new();
        store.append("Acme Corp", &[article("a")]).await.unwrap();
        store.append("Acme Corp", &[article("b")]).await.unwrap();
        store.append("Other", &[article("c")]).await.unwrap();

        let rows = store.load("Acme Corp").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "a");
        assert_eq!(rows[1].title, "b");
        assert_eq!(store.load("Other").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_rewrites_the_topic() {
        let store = MemoryStore::new();
        store.append("Acme Corp", &[article("a"), article("b")]).await.unwrap();
        store.replace("Acme Corp", &[article("b")]).await.unwrap();

        let rows = store.load("Acme Corp").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "b");
    }
}
