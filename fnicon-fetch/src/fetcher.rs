//! The fetch primitive used by icon discovery and image acquisition.

use std::path::Path;

use async_trait::async_trait;

use crate::error::FetchError;

/// Redirect-following HTTP GET.
///
/// Implementations follow 3xx responses up to a hop bound and enforce one
/// deadline per call. Tests substitute in-memory implementations.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns true if `url` finally answers 200 with an `image/*`
    /// content type. Every failure is `false`.
    async fn probe(&self, url: &str) -> bool;

    /// Fetches `url` and returns the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Streams the body of `url` into `dest`.
    ///
    /// On failure `dest` is left untouched.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}
