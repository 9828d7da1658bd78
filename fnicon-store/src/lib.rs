// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `fnicon` Store
//!
//! Persistence and session state for the `fnicon` dashboard.
//!
//! This crate provides:
//!
//! - **CatalogStore**: Catalog files with per-name write locks
//! - **AuthStore**: `password.json` with SHA-256 verification
//! - **SessionManager**: Login, sliding expiration, and periodic sweeps
//!   over an injected [`SessionStore`]
//! - **Persistence**: Atomic JSON file I/O
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use fnicon_core::SystemClock;
//! use fnicon_store::{AuthStore, CatalogStore, InMemorySessionStore, SessionManager};
//!
//! let catalogs = CatalogStore::new("public/conf");
//! let sessions = Arc::new(SessionManager::new(
//!     Arc::new(InMemorySessionStore::new()),
//!     AuthStore::new(catalogs.dir()),
//!     Arc::new(SystemClock),
//! ));
//!
//! let mut txn = catalogs.begin("fnicon.json").await?;
//! txn.records.retain(|r| r.sequence_number != 3);
//! txn.commit().await?;
//! ```

pub mod auth_store;
pub mod catalog_store;
pub mod error;
pub mod persistence;
pub mod session_manager;
pub mod session_store;

pub use auth_store::{AuthStore, hash_password};
pub use catalog_store::{
    CatalogStore, CatalogTxn, DEFAULT_CATALOG, PASSWORD_FILE, validate_catalog_name,
};
pub use error::StoreError;
pub use persistence::{ensure_dir, load_json, load_json_opt, save_json, save_json_private};
pub use session_manager::{SessionManager, SessionStatus};
pub use session_store::{InMemorySessionStore, SessionStore, Touch};
