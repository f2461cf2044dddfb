//! Live content fetched from a file server (e.g. a local dev server).
//!
//! Documents are read with `GET {base}/{key}`. Directory listings come from
//! a JSON endpoint, `GET {base}/{listing_endpoint}?path=...`, answering
//! `{ "folders": [...], "files": [...] }`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, StatusCode};

use super::{normalize_key, normalize_path, ContentSource, DirectoryListing};

/// Default listing endpoint, relative to the base URL
pub const DEFAULT_LISTING_ENDPOINT: &str = "__list";

/// HTTP-backed live source
pub struct HttpSource {
    /// Base URL without trailing slash
    base_url: String,
    /// Listing endpoint relative to the base URL
    listing_endpoint: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            listing_endpoint: DEFAULT_LISTING_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different listing endpoint
    pub fn with_listing_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.listing_endpoint = endpoint.into().trim_matches('/').to_string();
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a document URL
    fn document_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Build a listing URL
    fn listing_url(&self) -> String {
        format!("{}/{}", self.base_url, self.listing_endpoint)
    }
}

/// Dev servers answer unknown paths with the app's index page
///
/// Any HTML answer for a key that is not itself an HTML page counts.
fn is_html_fallback(key: &str, content_type: Option<&str>) -> bool {
    !(key.ends_with(".html") || key.ends_with(".htm"))
        && content_type
            .map(|ct| ct.to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
}

#[async_trait]
impl ContentSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key)?;
        let url = self.document_url(&key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            bail!("Content server returned {} for {}", status, url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if is_html_fallback(&key, content_type.as_deref()) {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(Some(text))
    }

    async fn list(&self, path: &str) -> Result<DirectoryListing> {
        let path = normalize_path(path)?;
        let url = self.listing_url();

        let response = self
            .client
            .get(&url)
            .query(&[("path", path.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to fetch listing {}", url))?;

        if !response.status().is_success() {
            bail!(
                "Content server returned {} for listing of '{}'",
                response.status(),
                path
            );
        }

        let listing: DirectoryListing = response
            .json()
            .await
            .context("Failed to parse directory listing")?;

        Ok(listing.normalized())
    }
}
