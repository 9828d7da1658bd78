//! Host implementations of the fetch primitive.
//!
//! - [`http`] - reqwest client with bounded redirect following

pub mod http;

pub use http::HttpFetcher;
