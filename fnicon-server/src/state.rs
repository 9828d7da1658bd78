//! Shared application state.

use std::sync::Arc;

use fnicon_core::Clock;
use fnicon_fetch::Fetcher;
use fnicon_store::{AuthStore, CatalogStore, InMemorySessionStore, SessionManager};

use crate::config::ServerConfig;
use crate::service::CatalogService;

/// State handed to every handler and middleware.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Directory layout.
    pub config: Arc<ServerConfig>,
    /// Login sessions and the password config.
    pub sessions: Arc<SessionManager>,
    /// Catalog operations.
    pub service: Arc<CatalogService>,
}

impl AppState {
    /// Wires the stores for `config`.
    ///
    /// Sessions live in memory and do not survive a restart.
    pub fn new(config: ServerConfig, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        let catalogs = CatalogStore::new(&config.conf_dir);
        let sessions = SessionManager::new(
            Arc::new(InMemorySessionStore::new()),
            AuthStore::new(&config.conf_dir),
            clock,
        );
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            service: Arc::new(CatalogService::new(catalogs, fetcher)),
        }
    }

    /// The password config store.
    pub fn auth(&self) -> &AuthStore {
        self.sessions.auth()
    }
}
