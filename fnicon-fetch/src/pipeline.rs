//! Icon pipeline for executing discovery strategies in order.
//!
//! The pipeline takes a list of icon strategies and executes them in
//! priority order until one yields a URL. Strategy errors never abort the
//! cascade; they are logged and recorded as failed attempts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fnicon_core::DEFAULT_ICON_URL;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::context::ResolveContext;
use crate::fetcher::Fetcher;
use crate::strategies::default_strategies;
use crate::strategy::{IconStrategy, StrategyKind};

// ============================================================================
// Resolve Attempt
// ============================================================================

/// Record of a single strategy run.
#[derive(Debug, Clone)]
pub struct ResolveAttempt {
    /// The strategy ID that was attempted.
    pub strategy_id: String,
    /// The kind of lookup used.
    pub kind: StrategyKind,
    /// Whether the strategy produced a URL.
    pub found: bool,
    /// Error if the strategy failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

// ============================================================================
// Resolve Outcome
// ============================================================================

/// The outcome of one icon resolution.
#[derive(Debug)]
pub struct ResolveOutcome {
    /// The discovered icon URL, if any.
    pub icon_url: Option<String>,
    /// All attempts made.
    pub attempts: Vec<ResolveAttempt>,
    /// Total duration of all attempts.
    pub duration: Duration,
}

impl ResolveOutcome {
    fn empty(start: Instant) -> Self {
        Self {
            icon_url: None,
            attempts: Vec::new(),
            duration: start.elapsed(),
        }
    }

    /// Returns true if an icon URL was found.
    pub fn is_found(&self) -> bool {
        self.icon_url.is_some()
    }

    /// Returns the strategy ID that found the icon, if any.
    pub fn successful_strategy(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.found)
            .map(|a| a.strategy_id.as_str())
    }

    /// Returns the icon URL, or [`DEFAULT_ICON_URL`] if nothing was found.
    pub fn icon_or_default(self) -> String {
        self.icon_url
            .unwrap_or_else(|| DEFAULT_ICON_URL.to_string())
    }
}

// ============================================================================
// Icon Pipeline
// ============================================================================

/// A cascade of icon strategies tried in order.
pub struct IconPipeline {
    fetcher: Arc<dyn Fetcher>,
    strategies: Vec<Box<dyn IconStrategy>>,
}

impl IconPipeline {
    /// Creates a pipeline with the default cascade.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_strategies(fetcher, default_strategies())
    }

    /// Creates a pipeline with the given strategies.
    pub fn with_strategies(fetcher: Arc<dyn Fetcher>, strategies: Vec<Box<dyn IconStrategy>>) -> Self {
        let mut pipeline = Self {
            fetcher,
            strategies,
        };
        pipeline.sort_by_priority();
        pipeline
    }

    /// Sorts strategies by priority (highest first).
    fn sort_by_priority(&mut self) {
        self.strategies.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Returns the number of strategies in the pipeline.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Returns the fetcher shared by all strategies.
    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Finds an icon URL for `homepage`.
    #[instrument(skip(self), fields(strategies = self.strategies.len()))]
    pub async fn resolve(&self, homepage: &str) -> ResolveOutcome {
        let start = Instant::now();

        let url = match Url::parse(homepage.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => url,
            Ok(url) => {
                warn!(scheme = url.scheme(), "Homepage is not an http(s) URL");
                return ResolveOutcome::empty(start);
            }
            Err(e) => {
                warn!(error = %e, "Homepage URL is invalid");
                return ResolveOutcome::empty(start);
            }
        };

        let ctx = ResolveContext::new(Arc::clone(&self.fetcher), url);
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let strategy_id = strategy.id();
            let kind = strategy.kind();
            let attempt_start = Instant::now();
            debug!(strategy = %strategy_id, kind = %kind, "Executing strategy");

            let (found, error) = match strategy.resolve(&ctx).await {
                Ok(Some(icon)) => {
                    attempts.push(ResolveAttempt {
                        strategy_id: strategy_id.to_string(),
                        kind,
                        found: true,
                        error: None,
                        duration: attempt_start.elapsed(),
                    });
                    info!(strategy = %strategy_id, icon = %icon, "Icon resolved");
                    return ResolveOutcome {
                        icon_url: Some(icon),
                        attempts,
                        duration: start.elapsed(),
                    };
                }
                Ok(None) => (false, None),
                Err(e) => {
                    warn!(strategy = %strategy_id, error = %e, "Strategy failed");
                    (false, Some(e.to_string()))
                }
            };

            attempts.push(ResolveAttempt {
                strategy_id: strategy_id.to_string(),
                kind,
                found,
                error,
                duration: attempt_start.elapsed(),
            });
        }

        info!("No icon found");
        ResolveOutcome {
            icon_url: None,
            attempts,
            duration: start.elapsed(),
        }
    }
}

impl std::fmt::Debug for IconPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.strategies.iter().map(|s| s.id()).collect();
        f.debug_struct("IconPipeline")
            .field("strategies", &ids)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
