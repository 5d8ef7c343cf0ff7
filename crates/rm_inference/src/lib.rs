pub mod models;
pub mod prompts;
pub mod report;

pub use models::{create_model, DummyModel, GeminiModel, ModelConfig, ModelHandles};
pub use prompts::FewShotExample;
pub use report::PeriodAggregator;

pub mod prelude {
    pub use super::models::{create_model, ModelConfig};
    pub use super::report::PeriodAggregator;
    pub use rm_core::{Result, Sentiment, SentimentClassifier, Summarizer};
}
