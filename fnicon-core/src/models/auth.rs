//! Auth configuration and session types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session timeout used when the config carries none.
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 30;

/// Shortest password accepted at initialization.
pub const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// Auth Config
// ============================================================================

/// Persisted password digest and session timeout (`password.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hex-encoded SHA-256 digest of the password.
    #[serde(default)]
    pub password: String,

    /// Session timeout in minutes.
    #[serde(default = "default_timeout")]
    pub timeout: u32,
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_MINUTES
}

impl AuthConfig {
    /// Creates a config from an already-hashed password.
    pub fn new(password_hash: impl Into<String>, timeout: u32) -> Self {
        Self {
            password: password_hash.into(),
            timeout,
        }
    }

    /// Returns true if a password digest is present.
    pub fn is_configured(&self) -> bool {
        !self.password.trim().is_empty()
    }

    /// Effective timeout in minutes; zero falls back to the default.
    pub fn timeout_minutes(&self) -> u32 {
        if self.timeout == 0 {
            DEFAULT_TIMEOUT_MINUTES
        } else {
            self.timeout
        }
    }

    /// Effective session lifetime.
    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(i64::from(self.timeout_minutes()))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            timeout: DEFAULT_TIMEOUT_MINUTES,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// A logged-in browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token carried in the session cookie.
    pub id: String,
    /// Instant at which the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session that expires `ttl` after `now`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: id.into(),
            expires_at: now + ttl,
        }
    }

    /// A session is expired once `now` reaches `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Slides the expiry to `ttl` after `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.expires_at = now + ttl;
    }
}

// ============================================================================
// Tests
// ============================================================================
