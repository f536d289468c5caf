//! Services for scoring, ranking, loading and watching listings

pub mod config;
pub mod data_loader;
pub mod formatter;
pub mod normalizer;
pub mod ranker;
pub mod url_extractor;
pub mod watcher;

pub use config::HomescoreConfig;
pub use data_loader::{DataLoaderService, LoadResult};
pub use formatter::{score_text, CriterionFormatter};
pub use normalizer::ScoreNormalizer;
pub use ranker::Ranker;
pub use url_extractor::extract_listing_urls;
pub use watcher::{UpdateEvent, WatchHandle, WatchOptions, WatchService};
