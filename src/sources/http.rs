//! HTTP listing endpoint

use std::path::PathBuf;
use std::time::Duration;

use super::{decode_listings, ListingSource, SourceLoad};
use crate::types::{HomescoreError, Result};

/// Fetches the listing collection from an endpoint returning a JSON array
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("homescore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HomescoreError::Fetch(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

impl ListingSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<SourceLoad> {
        tracing::debug!(url = %self.url, "fetching listings");

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| HomescoreError::Fetch(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HomescoreError::Fetch(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let mut bytes = response
            .bytes()
            .map_err(|e| HomescoreError::Fetch(format!("reading response failed: {}", e)))?
            .to_vec();
        decode_listings(&mut bytes)
    }

    fn watch_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_is_remote() {
        let source = HttpSource::new("http://127.0.0.1:9/api/apartments", Duration::from_secs(1)).unwrap();
        assert_eq!(source.name(), "http://127.0.0.1:9/api/apartments");
        assert!(source.is_remote());
    }

    #[test]
    fn test_unreachable_endpoint_is_fetch_error() {
        // port 9 (discard) is not expected to serve HTTP
        let source =
            HttpSource::new("http://127.0.0.1:9/api/apartments", Duration::from_millis(500)).unwrap();
        assert!(matches!(source.fetch(), Err(HomescoreError::Fetch(_))));
    }
}
