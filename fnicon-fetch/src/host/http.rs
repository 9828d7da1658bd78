//! reqwest-backed [`Fetcher`].
//!
//! The client is built with automatic redirects disabled; redirects are
//! followed by an explicit loop so the hop count and the single per-call
//! deadline can be enforced together.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header, redirect};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::context::{FetchBudget, FetchSettings};
use crate::error::FetchError;
use crate::fetcher::Fetcher;

/// User agent string for fnicon.
const USER_AGENT: &str = concat!("fnicon/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Fetcher
// ============================================================================

/// HTTP fetcher with bounded redirect following.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: Client,
    settings: FetchSettings,
}

impl HttpFetcher {
    /// Creates a fetcher with the default budgets.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a fetcher with custom budgets.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn with_settings(settings: FetchSettings) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { inner, settings })
    }

    /// Returns the budgets this fetcher enforces.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Issues GETs starting at `url` until a non-redirect response arrives.
    ///
    /// A 3xx without a usable `Location` header is returned as-is.
    async fn follow(&self, url: &str, max_redirects: u32) -> Result<Response, FetchError> {
        let mut current = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let mut hops = 0;

        loop {
            let response = self.inner.get(current.clone()).send().await?;
            let status = response.status();

            let location = status
                .is_redirection()
                .then(|| response.headers().get(header::LOCATION))
                .flatten()
                .and_then(|v| v.to_str().ok());

            let Some(location) = location else {
                debug!(url = %current, status = %status, hops, "Response received");
                return Ok(response);
            };

            if hops >= max_redirects {
                return Err(FetchError::TooManyRedirects {
                    url: current.to_string(),
                    max: max_redirects,
                });
            }

            let next = current.join(location)?;
            debug!(from = %current, to = %next, status = %status, "Following redirect");
            current = next;
            hops += 1;
        }
    }

    /// Runs `fut` under the deadline of `budget`.
    async fn with_deadline<T>(
        budget: FetchBudget,
        fut: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(budget.timeout, fut)
            .await
            .unwrap_or(Err(FetchError::Timeout(budget.timeout)))
    }

    async fn try_probe(&self, url: &str) -> Result<bool, FetchError> {
        let budget = self.settings.probe;
        Self::with_deadline(budget, async {
            let response = self.follow(url, budget.max_redirects).await?;
            if response.status() != StatusCode::OK {
                return Ok(false);
            }
            let is_image = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.to_ascii_lowercase().contains("image/"));
            Ok(is_image)
        })
        .await
    }

    async fn download(&self, url: &str, tmp: &Path) -> Result<(), FetchError> {
        let mut response = self.follow(url, self.settings.download.max_redirects).await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let mut file = tokio::fs::File::create(tmp).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        debug!(bytes = written, "Download complete");
        Ok(())
    }
}

/// Temporary sibling of `dest` used while a download is in flight.
fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.part"))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn probe(&self, url: &str) -> bool {
        match self.try_probe(url).await {
            Ok(valid) => {
                debug!(valid, "Probe finished");
                valid
            }
            Err(e) => {
                debug!(error = %e, "Probe failed");
                false
            }
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let budget = self.settings.text;
        Self::with_deadline(budget, async {
            let response = self.follow(url, budget.max_redirects).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            Ok(response.text().await?)
        })
        .await
    }

    #[instrument(skip(self, dest), fields(url = %url, dest = %dest.display()))]
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let tmp = partial_path(dest);
        let result = Self::with_deadline(self.settings.download, self.download(url, &tmp)).await;

        let result = match result {
            Ok(()) => tokio::fs::rename(&tmp, dest).await.map_err(FetchError::from),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(error = %e, "Download failed");
            match tokio::fs::remove_file(&tmp).await {
                Err(rm) if rm.kind() != std::io::ErrorKind::NotFound => {
                    warn!(path = %tmp.display(), error = %rm, "Failed to remove partial download");
                }
                _ => {}
            }
        }
        result
    }
}
