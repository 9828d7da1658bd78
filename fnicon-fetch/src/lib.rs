// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `fnicon` Fetch
//!
//! Redirect-following HTTP fetching and icon discovery for `fnicon`.
//!
//! ## Fetch Primitive
//!
//! - [`fetcher::Fetcher`] - `probe`, `fetch_text`, `fetch_to_file`
//! - [`host::http::HttpFetcher`] - reqwest implementation with bounded
//!   redirects and a single deadline per call
//! - [`context::FetchSettings`] - Per-call-kind hop and time budgets
//!
//! ## Icon Cascade
//!
//! The icon pipeline executes discovery strategies in priority order:
//!
//! - [`strategy::IconStrategy`] - Trait for discovery methods
//! - [`strategies`] - Root favicon, registrable-domain favicon,
//!   `<link rel="icon">`, first `<img>`
//! - [`pipeline::IconPipeline`] - Executes strategies in order
//! - [`acquire::acquire`] - Downloads the chosen icon
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fnicon_fetch::{HttpFetcher, IconPipeline};
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let pipeline = IconPipeline::new(fetcher);
//!
//! let outcome = pipeline.resolve("https://club.fnnas.com/").await;
//! let icon = outcome.icon_or_default();
//! ```

pub mod acquire;
pub mod context;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod host;
pub mod markup;
pub mod pipeline;
pub mod strategies;
pub mod strategy;
pub mod testing;

// Errors
pub use error::FetchError;

// Fetch primitive
pub use context::{FetchBudget, FetchSettings, ResolveContext};
pub use fetcher::Fetcher;
pub use host::http::HttpFetcher;

// Strategy & Pipeline
pub use acquire::acquire;
pub use domain::registrable_domain;
pub use pipeline::{IconPipeline, ResolveAttempt, ResolveOutcome};
pub use strategies::{DomainFavicon, ImgTag, LinkTag, RootFavicon, default_strategies};
pub use strategy::{IconStrategy, StrategyKind};
