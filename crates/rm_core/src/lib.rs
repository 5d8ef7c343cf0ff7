pub mod error;
pub mod traits;
pub mod types;

pub use error::{EnrichmentError, Error};
pub use traits::{ArticleEnricher, ArticleFetcher, LedgerStore, SentimentClassifier, Summarizer};
pub use types::{
    is_not_related, AggregateBullet, Article, RawArticle, Sentiment, Timeframe,
    NOT_RELATED_SENTINEL,
};

pub type Result<T> = std::result::Result<T, Error>;
