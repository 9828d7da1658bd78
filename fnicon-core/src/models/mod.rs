//! Domain models for `fnicon`.
//!
//! ## Submodules
//!
//! - [`record`] - Catalog record types and icon naming helpers
//! - [`auth`] - Persisted auth configuration and sessions

mod auth;
mod record;

// Re-export everything at the models level
pub use auth::{AuthConfig, DEFAULT_TIMEOUT_MINUTES, MIN_PASSWORD_LEN, Session};
pub use record::{
    CatalogRecord, DEFAULT_ICON_URL, IconChange, RecordPatch, icon_file_name, local_icon_ref, sanitize_title,
    sort_records,
};
#[cfg(test)]
mod serde_tests;
