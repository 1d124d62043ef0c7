pub mod html;
pub mod price;

use std::sync::Arc;
use std::time::Duration;

use scraper::Html;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::{FetchError, PageFetcher};
use crate::models::MetadataResult;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] FetchError),
}

/// Validate a caller-supplied URL. Only absolute http(s) URLs with a host
/// are fetched.
pub fn parse_target_url(raw: &str) -> Result<Url, ExtractError> {
    let parsed = Url::parse(raw.trim()).map_err(|e| ExtractError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ExtractError::InvalidUrl(format!(
                "unsupported scheme '{other}'"
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ExtractError::InvalidUrl("URL has no host".into()));
    }

    Ok(parsed)
}

/// Run every heuristic pass over a fetched page. Never fails: a pass that
/// finds nothing leaves its field empty.
pub fn extract_metadata(body: &str) -> MetadataResult {
    let doc = Html::parse_document(body);

    MetadataResult {
        title: html::extract_title(&doc),
        price: price::extract_price(body),
        thumbnail: html::extract_thumbnail(&doc),
    }
}

/// Fetches a page through an injected [`PageFetcher`] and scrapes it.
///
/// Holds no per-call state, so one instance serves any number of concurrent
/// requests.
pub struct MetadataExtractor {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl MetadataExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub async fn extract(&self, raw_url: &str) -> Result<MetadataResult, ExtractError> {
        let url = parse_target_url(raw_url)?;

        let body = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(error = %e, url = %url, "Failed to fetch page for metadata");
                return Err(e.into());
            }
            Err(_) => {
                warn!(url = %url, timeout = ?self.timeout, "Metadata fetch timed out");
                return Err(FetchError::Timeout.into());
            }
        };

        let result = extract_metadata(&body);
        if result.is_empty() {
            debug!(url = %url, bytes = body.len(), "No metadata found on page");
            return Ok(result);
        }
        debug!(
            url = %url,
            bytes = body.len(),
            title = result.title.is_some(),
            price = result.price.is_some(),
            thumbnail = result.thumbnail.is_some(),
            "Extracted page metadata"
        );

        Ok(result)
    }
}
