//! Fetch budgets and the per-resolution context.
//!
//! Every fetcher call runs under a [`FetchBudget`]: a hop bound for the
//! redirect chain and a single deadline that covers all hops and the body.
//! The [`ResolveContext`] is handed to every icon strategy during one
//! resolution and caches the homepage HTML so it is fetched at most once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

use crate::fetcher::Fetcher;

// ============================================================================
// Fetch Budget
// ============================================================================

/// Redirect and time bounds for a single fetcher call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBudget {
    /// Maximum number of redirects followed.
    pub max_redirects: u32,
    /// Deadline for the whole call, body included.
    pub timeout: Duration,
}

impl FetchBudget {
    /// Creates a budget.
    pub const fn new(max_redirects: u32, timeout: Duration) -> Self {
        Self {
            max_redirects,
            timeout,
        }
    }
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Budgets for the three kinds of fetcher calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Budget for image probes.
    pub probe: FetchBudget,
    /// Budget for HTML/text fetches.
    pub text: FetchBudget,
    /// Budget for file downloads.
    pub download: FetchBudget,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            probe: FetchBudget::new(3, Duration::from_secs(5)),
            text: FetchBudget::new(5, Duration::from_secs(10)),
            download: FetchBudget::new(5, Duration::from_secs(30)),
        }
    }
}

impl FetchSettings {
    /// Scales every timeout to `timeout`, keeping the hop bounds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe.timeout = timeout;
        self.text.timeout = timeout;
        self.download.timeout = timeout;
        self
    }
}

// ============================================================================
// Resolve Context
// ============================================================================

/// Context provided to icon strategies for one homepage.
pub struct ResolveContext {
    /// Fetcher used for every request of this resolution.
    pub fetcher: Arc<dyn Fetcher>,
    /// Parsed homepage URL.
    pub homepage: Url,
    homepage_html: OnceCell<Option<String>>,
}

impl ResolveContext {
    /// Creates a context for `homepage`.
    pub fn new(fetcher: Arc<dyn Fetcher>, homepage: Url) -> Self {
        Self {
            fetcher,
            homepage,
            homepage_html: OnceCell::new(),
        }
    }

    /// `{scheme}://{host[:port]}` of the homepage.
    pub fn origin(&self) -> String {
        self.homepage.origin().ascii_serialization()
    }

    /// Homepage host name, if the URL has one.
    pub fn host(&self) -> Option<&str> {
        self.homepage.host_str()
    }

    /// Returns the homepage HTML, fetching it on first use.
    ///
    /// A failed fetch is logged and cached as `None`, so later strategies
    /// do not retry it.
    pub async fn homepage_html(&self) -> Option<&str> {
        self.homepage_html
            .get_or_init(|| async {
                match self.fetcher.fetch_text(self.homepage.as_str()).await {
                    Ok(html) => {
                        debug!(url = %self.homepage, bytes = html.len(), "Fetched homepage");
                        Some(html)
                    }
                    Err(e) => {
                        warn!(url = %self.homepage, error = %e, "Homepage fetch failed");
                        None
                    }
                }
            })
            .await
            .as_deref()
    }
}

impl std::fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("homepage", &self.homepage.as_str())
            .finish_non_exhaustive()
    }
}
