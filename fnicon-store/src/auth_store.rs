//! Password config persistence and verification.

use std::path::{Path, PathBuf};

use fnicon_core::{AuthConfig, DEFAULT_TIMEOUT_MINUTES, MIN_PASSWORD_LEN};
use ring::digest;
use tracing::{info, warn};

use crate::catalog_store::PASSWORD_FILE;
use crate::error::StoreError;
use crate::persistence::{load_json_opt, save_json_private};

/// Hex-encoded SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(digest::digest(&digest::SHA256, password.as_bytes()))
}

/// Compares two byte strings without early exit on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ============================================================================
// Auth Store
// ============================================================================

/// Reads and writes `password.json`.
///
/// The file is re-read on every call; edits made on disk take effect
/// without a restart.
#[derive(Debug, Clone)]
pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    /// Creates a store for `{conf_dir}/password.json`.
    pub fn new(conf_dir: &Path) -> Self {
        Self {
            path: conf_dir.join(PASSWORD_FILE),
        }
    }

    /// Path of the auth config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file as-is. A corrupt file reads as absent.
    async fn load_raw(&self) -> Result<Option<AuthConfig>, StoreError> {
        match load_json_opt::<AuthConfig>(&self.path).await {
            Err(StoreError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable auth config");
                Ok(None)
            }
            other => other,
        }
    }

    /// Returns the config if it holds a password digest.
    pub async fn load(&self) -> Result<Option<AuthConfig>, StoreError> {
        Ok(self.load_raw().await?.filter(AuthConfig::is_configured))
    }

    /// Returns true if a valid password config exists. Read errors count
    /// as "not configured".
    pub async fn is_configured(&self) -> bool {
        match self.load().await {
            Ok(config) => config.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read auth config");
                false
            }
        }
    }

    /// Current session timeout, falling back to the default when no
    /// config can be read.
    pub async fn timeout_minutes(&self) -> u32 {
        match self.load_raw().await {
            Ok(Some(config)) => config.timeout_minutes(),
            Ok(None) => DEFAULT_TIMEOUT_MINUTES,
            Err(e) => {
                warn!(error = %e, "Failed to read auth config, using default timeout");
                DEFAULT_TIMEOUT_MINUTES
            }
        }
    }

    /// Sets the initial password.
    ///
    /// An existing timeout is kept; otherwise the default applies.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidPassword`] if the password is too short
    /// - [`StoreError::PasswordAlreadySet`] if a password is configured
    pub async fn initialize(&self, password: &str) -> Result<AuthConfig, StoreError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::InvalidPassword(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let existing = self.load_raw().await?;
        if existing.as_ref().is_some_and(AuthConfig::is_configured) {
            return Err(StoreError::PasswordAlreadySet);
        }

        let timeout = existing
            .map(|c| c.timeout)
            .filter(|&t| t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MINUTES);
        let config = AuthConfig::new(hash_password(password), timeout);
        save_json_private(&self.path, &config).await?;

        info!(timeout, "Password initialized");
        Ok(config)
    }

    /// Checks `password` against the stored digest.
    ///
    /// # Errors
    ///
    /// - [`StoreError::PasswordNotSet`] if no password is configured
    /// - [`StoreError::InvalidPassword`] on mismatch
    pub async fn verify(&self, password: &str) -> Result<AuthConfig, StoreError> {
        let config = self.load().await?.ok_or(StoreError::PasswordNotSet)?;

        let supplied = hash_password(password);
        let stored = config.password.trim().to_ascii_lowercase();
        if constant_time_eq(supplied.as_bytes(), stored.as_bytes()) {
            Ok(config)
        } else {
            Err(StoreError::InvalidPassword("password mismatch".to_string()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
