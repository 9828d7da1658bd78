// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `fnicon` Core
//!
//! Core types, models, and traits for the `fnicon` dashboard.
//!
//! This crate provides the foundational abstractions used across all other
//! `fnicon` crates, including:
//!
//! - Domain models (catalog records, auth config, sessions)
//! - Error types
//! - Sequence-number allocation for catalog records
//! - The [`Clock`] abstraction used by session expiry
//!
//! ## Key Types
//!
//! ### Catalog Types
//! - [`CatalogRecord`] - One launcher shortcut (title, URLs, icon)
//! - [`RecordPatch`] - Partial record used for create and update requests
//! - [`next_sequence`] - Gap-filling sequence allocator
//!
//! ### Auth Types
//! - [`AuthConfig`] - Persisted password digest and session timeout
//! - [`Session`] - A logged-in browser session

pub mod error;
pub mod models;
pub mod sequence;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Catalog types
    CatalogRecord,
    IconChange,
    RecordPatch,
    DEFAULT_ICON_URL,
    icon_file_name,
    local_icon_ref,
    sanitize_title,
    sort_records,
    // Auth types
    AuthConfig,
    DEFAULT_TIMEOUT_MINUTES,
    MIN_PASSWORD_LEN,
    Session,
};

pub use sequence::{next_sequence, next_sequence_from};

// Re-export traits
pub use traits::{Clock, ManualClock, SystemClock};
