// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! HTTP server for the `fnicon` dashboard.
//!
//! Serves the static front end behind a session gate and exposes a JSON
//! API for editing catalogs. Creating or editing a record discovers its
//! icon through [`fnicon_fetch::IconPipeline`] and mirrors it into the
//! configuration directory.

pub mod api;
pub mod apply;
pub mod config;
pub mod cookie;
pub mod extract;
pub mod gate;
pub mod response;
pub mod router;
pub mod service;
pub mod startup;
pub mod state;

pub use apply::{ApplyError, apply_settings, inject_script, publish_script};
pub use config::{Cli, ServerConfig};
pub use response::{ApiError, ApiResponse};
pub use router::build_router;
pub use service::CatalogService;
pub use state::AppState;
