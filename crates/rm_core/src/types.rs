use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary value the LLM returns for content it considers off-topic. Rows
/// carrying it (with or without a trailing period) are excluded from every
/// relevant view.
pub const NOT_RELATED_SENTINEL: &str = "Not-related content";

/// True when a summary is the Not-related sentinel. Matching is exact apart
/// from an optional trailing period.
pub fn is_not_related(summary: &str) -> bool {
    summary == NOT_RELATED_SENTINEL || summary.strip_suffix('.') == Some(NOT_RELATED_SENTINEL)
}

/// An article as reported by the news search, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
    pub published_date: NaiveDate,
    pub url: String,
    pub publisher: String,
}

/// One ledger row. `title` is the deduplication identity within a topic.
///
/// `published_date` is the coarse date reported by the search feed;
/// `publish_date` is the refined date extracted during enrichment and is the
/// one all recency filters use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub published_date: NaiveDate,
    pub url: String,
    pub publisher: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub default_sentiment: Option<f64>,
    #[serde(default)]
    pub entities: Option<BTreeSet<String>>,
    #[serde(default)]
    pub text_sentiment: Option<Sentiment>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub is_relevant: bool,
}

impl Article {
    /// A row with only the fetched fields; enrichment and annotation fields
    /// start absent.
    pub fn from_raw(raw: RawArticle) -> Self {
        Self {
            title: raw.title,
            description: raw.description,
            published_date: raw.published_date,
            url: raw.url,
            publisher: raw.publisher,
            content: None,
            image_url: None,
            publish_date: None,
            default_sentiment: None,
            entities: None,
            text_sentiment: None,
            summary: None,
            is_relevant: false,
        }
    }

    /// Whether the row may appear in relevance-filtered views: marked
    /// relevant, summarized, and the summary is not the Not-related
    /// sentinel.
    pub fn is_reportable(&self) -> bool {
        self.is_relevant && self.summary.as_deref().map_or(false, |s| !is_not_related(s))
    }
}

/// Categorical sentiment produced by the classification stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    NotRelated,
}

impl Sentiment {
    /// Parse an LLM label leniently: surrounding whitespace, trailing
    /// punctuation and casing are ignored.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_end_matches(['.', '!'])
            .to_ascii_lowercase();
        match cleaned.as_str() {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "not-related" | "not related" | "notrelated" => Some(Self::NotRelated),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::NotRelated => "Not-related",
        };
        write!(f, "{label}")
    }
}

/// Named reporting windows, anchored at the aggregation run's current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Weekly,
    Monthly,
    Quarterly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Self::Weekly, Self::Monthly, Self::Quarterly];

    pub fn days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Quarterly => 120,
        }
    }

    /// First date excluded from this window; articles must be strictly newer
    /// to fall inside it.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - chrono::Duration::days(self.days())
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
        };
        write!(f, "{label}")
    }
}

/// One row of the aggregate report table. Each aggregation run produces the
/// full table fresh; it replaces the previous one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateBullet {
    pub topic: String,
    pub timeframe: Timeframe,
    pub positive: String,
    pub negative: String,
}
