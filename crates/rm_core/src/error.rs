use thiserror::Error;

/// Per-article enrichment failures. These never abort a merge: the affected
/// candidate is skipped and the batch continues.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("enrichment request timed out for {0}")]
    Timeout(String),

    #[error("enrichment response missing field: {0}")]
    MissingField(&'static str),

    #[error("unparseable publish date: {0}")]
    UnparseableDate(String),

    #[error("enrichment request failed: {0}")]
    Request(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Summarization error: {0}")]
    Summarization(String),

    #[error("Corrupt ledger for topic '{topic}': {reason}")]
    LedgerCorruption { topic: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
