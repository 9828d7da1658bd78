//! JSON API handlers.

pub mod auth;
pub mod files;
pub mod settings;
