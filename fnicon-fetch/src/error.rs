//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, or protocol failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The call did not finish within its deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The redirect chain exceeded its bound.
    #[error("Too many redirects (max {max}) at {url}")]
    TooManyRedirects {
        /// URL whose response would have been the next hop.
        url: String,
        /// Hop bound that was exceeded.
        max: u32,
    },

    /// URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Final response had an unacceptable status code.
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Local file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Returns true if the failure came from the remote side rather than
    /// from local I/O or a malformed URL.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::TooManyRedirects { .. } | Self::Status(_)
        )
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(FetchError::Timeout(Duration::from_secs(5)).is_remote());
        assert!(FetchError::Status(404).is_remote());
        assert!(!FetchError::InvalidUrl("x".into()).is_remote());
        assert!(!FetchError::Io(std::io::Error::other("disk")).is_remote());
    }

    #[test]
    fn test_display() {
        let err = FetchError::TooManyRedirects {
            url: "http://a/".into(),
            max: 5,
        };
        assert_eq!(err.to_string(), "Too many redirects (max 5) at http://a/");
    }
}
