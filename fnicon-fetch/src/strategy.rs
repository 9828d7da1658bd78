//! Icon strategy trait and types.
//!
//! A strategy represents one method of discovering an icon URL for a
//! homepage. The pipeline tries strategies in priority order until one
//! yields a URL.

use async_trait::async_trait;
use std::fmt;

use crate::context::ResolveContext;
use crate::error::FetchError;

// ============================================================================
// Strategy Kind
// ============================================================================

/// How a strategy finds its candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Probes a conventional favicon location.
    Probe,
    /// Scans the homepage HTML.
    Scrape,
}

impl StrategyKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Probe => "Probe",
            Self::Scrape => "Scrape",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Icon Strategy Trait
// ============================================================================

/// A method of discovering an icon URL.
///
/// `Ok(None)` means "nothing found here"; the pipeline moves on either way,
/// but errors are recorded and logged.
#[async_trait]
pub trait IconStrategy: Send + Sync {
    /// Unique identifier for this strategy (e.g. `"favicon.root"`).
    fn id(&self) -> &str;

    /// The kind of lookup this strategy performs.
    fn kind(&self) -> StrategyKind;

    /// Priority of this strategy (higher = try first).
    fn priority(&self) -> u32;

    /// Looks for an icon URL.
    async fn resolve(&self, ctx: &ResolveContext) -> Result<Option<String>, FetchError>;
}
