//! Unified data loading service for CLI and TUI
//!
//! Fetches the full listing collection from a source, assigns positional
//! ids, then scores and ranks it. Every load is a full reload; nothing is
//! merged with a previous result.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::services::Ranker;
use crate::sources::ListingSource;
use crate::types::{LoadWarning, RankedListing, RankingSummary, Result};

/// Result of one full load
#[derive(Debug)]
pub struct LoadResult {
    /// Listings sorted by descending aggregate score
    pub ranked: Vec<RankedListing>,
    pub summary: RankingSummary,
    /// Records or files that were skipped
    pub warnings: Vec<LoadWarning>,
    pub loaded_at: DateTime<Local>,
}

/// Loads and ranks listings from one source
#[derive(Clone)]
pub struct DataLoaderService {
    source: Arc<dyn ListingSource>,
}

impl DataLoaderService {
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        Self { source }
    }

    pub fn source_handle(&self) -> Arc<dyn ListingSource> {
        Arc::clone(&self.source)
    }

    /// Fetch, score and rank. Fetch failures are returned as-is; decoding
    /// problems in individual records only produce warnings.
    pub fn load(&self) -> Result<LoadResult> {
        let load = self.source.fetch()?;

        for warning in &load.warnings {
            tracing::warn!(source = self.source.name(), "{}", warning);
        }

        let mut listings = load.listings;
        for (index, listing) in listings.iter_mut().enumerate() {
            if listing.id.is_none() {
                listing.id = Some(format!("#{}", index + 1));
            }
        }

        let ranked = Ranker::rank(listings);
        let summary = Ranker::summary(&ranked);

        tracing::info!(
            source = self.source.name(),
            listings = summary.count,
            skipped = load.warnings.len(),
            best = summary.best,
            "listings loaded"
        );

        Ok(LoadResult {
            ranked,
            summary,
            warnings: load.warnings,
            loaded_at: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::FileSource;
    use std::fs;
    use tempfile::TempDir;

    fn loader_for(content: &str) -> (TempDir, DataLoaderService) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.json");
        fs::write(&path, content).unwrap();
        let loader = DataLoaderService::new(Arc::new(FileSource::new(path)));
        (dir, loader)
    }

    #[test]
    fn test_load_ranks_listings() {
        let (_dir, loader) = loader_for(
            r#"[
                {"id": "a", "scores_detail": {"location": {"score": 5}}},
                {"id": "b", "scores_detail": {"location": {"score": 25}}}
            ]"#,
        );
        let result = loader.load().unwrap();
        assert_eq!(result.ranked.len(), 2);
        assert_eq!(result.ranked[0].card.id, "b");
        assert_eq!(result.summary.count, 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_assigns_positional_ids() {
        let (_dir, loader) = loader_for(r#"[{"id": "a"}, {"titre": "sans id"}]"#);
        let result = loader.load().unwrap();
        let ids: Vec<_> = result.ranked.iter().map(|r| r.card.id.as_str()).collect();
        assert!(ids.contains(&"#2"));
    }

    #[test]
    fn test_load_reports_skipped_records() {
        let (_dir, loader) = loader_for(r#"[{"id": "a"}, "garbage"]"#);
        let result = loader.load().unwrap();
        assert_eq!(result.ranked.len(), 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_load_missing_source_fails() {
        let loader = DataLoaderService::new(Arc::new(FileSource::new("/nonexistent/x.json".into())));
        assert!(loader.load().is_err());
    }

    #[test]
    fn test_reload_reflects_file_changes() {
        let (dir, loader) = loader_for(r#"[{"id": "a"}]"#);
        assert_eq!(loader.load().unwrap().ranked.len(), 1);

        fs::write(dir.path().join("listings.json"), r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        assert_eq!(loader.load().unwrap().ranked.len(), 2);
    }
}
