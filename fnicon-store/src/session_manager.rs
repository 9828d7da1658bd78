//! Login, sliding expiration, logout, and periodic sweeping.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use fnicon_core::{Clock, Session};
use ring::rand::{SecureRandom, SystemRandom};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::auth_store::AuthStore;
use crate::error::StoreError;
use crate::session_store::{SessionStore, Touch};

/// Random bytes per session token.
const TOKEN_BYTES: usize = 32;

/// Result of checking a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session is valid; expiry has been pushed forward.
    Active {
        /// The refreshed session.
        session: Session,
        /// Timeout applied, in minutes.
        timeout_minutes: u32,
    },
    /// Session existed but had expired; it has been removed.
    Expired,
    /// No session with this token.
    Unknown,
}

// ============================================================================
// Session Manager
// ============================================================================

/// Ties the session store to the password config and a clock.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    auth: AuthStore,
    clock: Arc<dyn Clock>,
    rng: SystemRandom,
}

impl SessionManager {
    /// Creates a manager.
    pub fn new(store: Arc<dyn SessionStore>, auth: AuthStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            auth,
            clock,
            rng: SystemRandom::new(),
        }
    }

    /// The password config store.
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    fn generate_token(&self) -> Result<String, StoreError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| StoreError::Io(std::io::Error::other("system RNG unavailable")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Verifies `password` and opens a session.
    ///
    /// # Errors
    ///
    /// Propagates [`AuthStore::verify`] failures; no session is created.
    pub async fn login(&self, password: &str) -> Result<(Session, u32), StoreError> {
        let config = self.auth.verify(password).await?;
        let timeout_minutes = config.timeout_minutes();

        let session = Session::new(self.generate_token()?, self.clock.now(), config.session_ttl());
        self.store.put(session.clone()).await;

        info!(timeout_minutes, "Login succeeded");
        Ok((session, timeout_minutes))
    }

    /// Checks `token` and, if valid, slides its expiry to now plus the
    /// currently configured timeout.
    ///
    /// Expired sessions are removed on detection.
    pub async fn validate(&self, token: &str) -> SessionStatus {
        let timeout_minutes = self.auth.timeout_minutes().await;
        let ttl = Duration::minutes(i64::from(timeout_minutes));

        match self.store.touch(token, self.clock.now(), ttl).await {
            Touch::Refreshed(session) => SessionStatus::Active {
                session,
                timeout_minutes,
            },
            Touch::Expired => {
                debug!("Expired session removed on access");
                SessionStatus::Expired
            }
            Touch::Missing => SessionStatus::Unknown,
        }
    }

    /// Ends the session with `token`. Returns true if it existed.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.store.delete(token).await;
        if removed {
            info!("Logged out");
        }
        removed
    }

    /// Removes every expired session.
    pub async fn sweep(&self) -> usize {
        let removed = self.store.sweep(self.clock.now()).await;
        if removed > 0 {
            info!(removed, "Swept expired sessions");
        } else {
            debug!("Session sweep found nothing to remove");
        }
        removed
    }

    /// Runs [`sweep`](Self::sweep) every `period` until the handle is
    /// aborted.
    pub fn spawn_sweeper(self: Arc<Self>, period: StdDuration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                self.sweep().await;
            }
        })
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
