//! News acquisition: topic search, full-text enrichment, logo download, and
//! the manager that drives the per-topic pipeline.

pub mod google_news;
pub mod logo;
pub mod manager;
pub mod world_news;

pub use google_news::GoogleNewsFetcher;
pub use logo::LogoFetcher;
pub use manager::MonitorManager;
pub use world_news::WorldNewsEnricher;

pub mod prelude {
    pub use super::{GoogleNewsFetcher, LogoFetcher, MonitorManager, WorldNewsEnricher};
    pub use rm_core::{ArticleEnricher, ArticleFetcher, RawArticle, Result};
}
