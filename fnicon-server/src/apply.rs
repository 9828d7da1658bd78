//! Publishing the configuration into the served tree.
//!
//! Applying settings mirrors the configuration directory into
//! `{www}/conf` and rewrites `{www}/index.html` so the front-end script is
//! loaded before the application root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use fnicon_store::PASSWORD_FILE;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::ServerConfig;

/// Tag inserted between `<body>` and the root element.
const SCRIPT_TAG: &str = "\n  <script src=\"/script.js\"></script>";

/// Opening `<body>`, anything, then the `<div id="root">` opening tag.
static BODY_TO_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(<body[^>]*>)(.*?)(<div[^>]*id="root"[^>]*>)"#).expect("Invalid regex")
});

/// Errors from applying settings.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The served tree has no `index.html`.
    #[error("{} does not exist", .0.display())]
    MissingIndex(PathBuf),
}

/// Replaces everything between `<body…>` and `<div … id="root" …>` with
/// the script tag. Markup without both tags is returned unchanged.
pub fn inject_script(html: &str) -> String {
    BODY_TO_ROOT
        .replace(html, |caps: &regex::Captures<'_>| {
            format!("{}{SCRIPT_TAG}{}", &caps[1], &caps[3])
        })
        .into_owned()
}

/// Files of the configuration directory that are published.
fn is_published(name: &str) -> bool {
    name != PASSWORD_FILE && !name.starts_with('.') && !name.ends_with(".tmp")
}

async fn clear_files(dir: &Path) -> Result<usize, ApplyError> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

async fn copy_conf(from: &Path, to: &Path) -> Result<usize, ApplyError> {
    let mut copied = 0;
    let mut entries = tokio::fs::read_dir(from).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !entry.file_type().await?.is_file() || !is_published(&name.to_string_lossy()) {
            continue;
        }
        tokio::fs::copy(entry.path(), to.join(&name)).await?;
        copied += 1;
    }
    Ok(copied)
}

/// Mirrors the configuration into the served tree and rewrites its
/// `index.html`.
///
/// # Errors
///
/// Fails on any filesystem error, or if `{www}/index.html` is missing.
#[instrument(skip(config), fields(www = %config.www_dir.display()))]
pub async fn apply_settings(config: &ServerConfig) -> Result<(), ApplyError> {
    let target = config.www_conf_dir();
    if tokio::fs::try_exists(&target).await? {
        let removed = clear_files(&target).await?;
        debug!(removed, "Cleared published conf");
    } else {
        tokio::fs::create_dir_all(&target).await?;
    }

    let copied = copy_conf(&config.conf_dir, &target).await?;

    let index = config.www_index();
    if !tokio::fs::try_exists(&index).await? {
        return Err(ApplyError::MissingIndex(index));
    }
    let html = tokio::fs::read_to_string(&index).await?;
    tokio::fs::write(&index, inject_script(&html)).await?;

    info!(copied, "Settings applied");
    Ok(())
}

/// Copies the front-end script to `{www}/script.js`, world-readable.
///
/// Failures are logged and otherwise ignored.
pub async fn publish_script(config: &ServerConfig) {
    let target = config.www_dir.join("script.js");
    let result = async {
        tokio::fs::create_dir_all(&config.www_dir).await?;
        tokio::fs::copy(&config.script_path, &target).await?;
        set_readable(&target).await
    }
    .await;

    match result {
        Ok(()) => debug!(path = %target.display(), "Published front-end script"),
        Err(e) => warn!(
            source = %config.script_path.display(),
            error = %e,
            "Failed to publish front-end script"
        ),
    }
}

#[cfg(unix)]
async fn set_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await
}

#[cfg(not(unix))]
async fn set_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
