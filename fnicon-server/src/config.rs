//! Command-line options and the derived server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

// ============================================================================
// CLI Definition
// ============================================================================

/// fnicon - dashboard icon manager.
#[derive(Debug, Clone, Parser)]
#[command(name = "fnicon")]
#[command(about = "Dashboard icon launcher manager")]
#[command(long_about = r#"
fnicon serves a static dashboard front end and a password-protected API
for editing its catalog of shortcuts. Icons for new shortcuts are
discovered from the target site and mirrored locally.

Layout under --public-dir:
  conf/       catalogs (*.json), password.json, downloaded icons
  fnwww/      served tree updated by "apply settings"

Examples:
  fnicon                          # Listen on 0.0.0.0:3000
  fnicon --port 8080 --verbose    # Custom port, debug logging
  PORT=8080 fnicon --skip-startup # Skip image init and apply-settings
"#)]
#[command(version)]
pub struct Cli {
    /// Port to listen on.
    #[arg(long, short, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, env = "FNICON_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Directory holding the static front end and `conf/`.
    #[arg(long, env = "FNICON_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Front-end script copied into the served tree at startup.
    #[arg(long, env = "FNICON_SCRIPT", default_value = "script.js")]
    pub script: PathBuf,

    /// Seconds between expired-session sweeps.
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval_secs: u64,

    /// Skip image initialization and apply-settings at startup.
    #[arg(long)]
    pub skip_startup: bool,

    /// Verbose output (show debug info).
    #[arg(long, short)]
    pub verbose: bool,

    /// Quiet mode (no logging).
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    /// Socket address to listen on.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Builds the server configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(&self.public_dir, &self.script)
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs))
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// Directory layout and timing of a running server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Root of the static front end.
    pub public_dir: PathBuf,
    /// Catalogs, `password.json`, and downloaded icons.
    pub conf_dir: PathBuf,
    /// Served tree rewritten by apply-settings.
    pub www_dir: PathBuf,
    /// Front-end script copied into `www_dir`.
    pub script_path: PathBuf,
    /// Period of the expired-session sweep.
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Creates the layout rooted at `public_dir`.
    pub fn new(public_dir: &Path, script_path: &Path) -> Self {
        Self {
            public_dir: public_dir.to_path_buf(),
            conf_dir: public_dir.join("conf"),
            www_dir: public_dir.join("fnwww"),
            script_path: script_path.to_path_buf(),
            sweep_interval: Duration::from_secs(300),
        }
    }

    /// Overrides the sweep period.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// `{www}/conf`, the copy of the configuration directory.
    pub fn www_conf_dir(&self) -> PathBuf {
        self.www_dir.join("conf")
    }

    /// `{www}/index.html`.
    pub fn www_index(&self) -> PathBuf {
        self.www_dir.join("index.html")
    }
}
