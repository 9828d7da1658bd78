//! In-memory [`Fetcher`] for tests of code that discovers or downloads
//! icons.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// A fetcher that answers from fixed tables and records every call.
///
/// Unknown probe URLs are `false`; unknown text and file URLs fail with a
/// 404 status.
#[derive(Debug, Default)]
pub struct MockFetcher {
    images: HashMap<String, Vec<u8>>,
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Creates a fetcher that knows nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a valid image at `url`.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.images.insert(url.into(), bytes.into());
        self
    }

    /// Registers an HTML page at `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Every call so far, formatted as `"{method} {url}"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls of `method` (`"probe"`, `"text"` or `"file"`).
    pub fn count(&self, method: &str) -> usize {
        let prefix = format!("{method} ");
        self.calls().iter().filter(|c| c.starts_with(&prefix)).count()
    }

    fn record(&self, method: &str, url: &str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{method} {url}"));
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn probe(&self, url: &str) -> bool {
        self.record("probe", url);
        self.images.contains_key(url)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.record("text", url);
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.record("file", url);
        let bytes = self.images.get(url).ok_or(FetchError::Status(404))?;
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }
}
