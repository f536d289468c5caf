//! Listing sources: local JSON files and HTTP endpoints

mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::types::{HomescoreError, Listing, LoadWarning, Result};

/// Listings decoded from one fetch, plus anything that was skipped
#[derive(Debug, Default)]
pub struct SourceLoad {
    pub listings: Vec<Listing>,
    pub warnings: Vec<LoadWarning>,
}

impl SourceLoad {
    fn extend(&mut self, other: SourceLoad) {
        self.listings.extend(other.listings);
        self.warnings.extend(other.warnings);
    }
}

/// Trait for anything that can produce the full listing collection
pub trait ListingSource: Send + Sync {
    /// Human-readable source name (path or URL)
    fn name(&self) -> &str;

    /// Fetch and decode every listing. Each call is a full reload.
    fn fetch(&self) -> Result<SourceLoad>;

    /// Files whose modification signals new data. Empty for remote sources,
    /// which are refreshed on a timer instead.
    fn watch_paths(&self) -> Vec<PathBuf>;

    fn is_remote(&self) -> bool {
        self.watch_paths().is_empty()
    }
}

/// Pick a source implementation from a path or URL
pub fn open_source(location: &str, timeout: Duration) -> Result<Box<dyn ListingSource>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(HomescoreError::Config("no listing source configured".into()));
    }
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(PathBuf::from(location))))
    }
}

/// Decode a JSON document holding listings: either an array of listing
/// objects or an object whose values are listings (keys become fallback ids).
pub fn decode_listings(bytes: &mut [u8]) -> Result<SourceLoad> {
    let document: Value =
        simd_json::from_slice(bytes).map_err(|e| HomescoreError::Parse(e.to_string()))?;

    let records: Vec<(Option<String>, Value)> = match document {
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        other => {
            return Err(HomescoreError::Parse(format!(
                "expected an array or object of listings, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut load = SourceLoad::default();
    for (index, (key, record)) in records.into_iter().enumerate() {
        if !record.is_object() {
            load.warnings.push(LoadWarning::SkippedRecord {
                index,
                reason: format!("expected an object, found {}", json_kind(&record)),
            });
            continue;
        }
        match serde_json::from_value::<Listing>(record) {
            Ok(mut listing) => {
                if listing.id.is_none() {
                    listing.id = key;
                }
                load.listings.push(listing);
            }
            Err(e) => load.warnings.push(LoadWarning::SkippedRecord {
                index,
                reason: e.to_string(),
            }),
        }
    }
    Ok(load)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
