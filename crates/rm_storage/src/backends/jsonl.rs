use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rm_core::{Article, Error, LedgerStore, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// One JSON Lines file per topic under the data directory. Appends add
/// serialized rows at the end of the file; only the annotation backfill
/// rewrites a file, through `replace`.
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn topic_path(&self, topic: &str) -> PathBuf {
        // Topic names become filenames; path separators are the only
        // characters that must not leak through.
        let safe: String = topic
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.data_dir.join(format!("{safe}.jsonl"))
    }

    fn encode(articles: &[Article]) -> Result<String> {
        let mut out = String::new();
        for article in articles {
            out.push_str(&serde_json::to_string(article)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[async_trait]
impl LedgerStore for JsonlStore {
    async fn load(&self, topic: &str) -> Result<Vec<Article>> {
        let path = self.topic_path(topic);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(line).map_err(|e| Error::LedgerCorruption {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    async fn append(&self, topic: &str, articles: &[Article]) -> Result<()> {
        if articles.is_empty() {
            return Ok(());
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.topic_path(topic))
            .await?;
        file.write_all(Self::encode(articles)?.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn replace(&self, topic: &str, articles: &[Article]) -> Result<()> {
        let path = self.topic_path(topic);
        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, Self::encode(articles)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
