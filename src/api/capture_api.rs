//! Capture API
//!
//! Entry points a host process uses to set up logging, build the capture
//! configuration and create the plugin.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::capture::{AllowList, CapturePlugin};

/// Default base directory for capture artifacts
pub const DEFAULT_LOG_DIR: &str = "/tmp/request-logs";

/// Hosts captured when no allow-list is configured
pub const DEFAULT_ALLOWED_HOSTS: [&str; 3] = ["blog.fefe.de", "postman-echo.com", "httpbin.org"];

/// Get the version of the capture library
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Initialize logging (call once at startup)
///
/// Logs go to stderr. An already installed subscriber is left in place.
pub fn init_core() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }

    let level = resolve_log_level();
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("Exchange logger initialized v{}", env!("CARGO_PKG_VERSION"));
}

fn resolve_log_level() -> tracing::level_filters::LevelFilter {
    use tracing::level_filters::LevelFilter;

    match std::env::var("RUST_LOG") {
        Ok(val) => match val.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" | "warning" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        },
        Err(_) => LevelFilter::INFO,
    }
}

/// Capture configuration, immutable once the plugin is built
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "CaptureConfigFile")]
pub struct CaptureConfig {
    /// Base directory for capture artifacts
    pub log_dir: PathBuf,
    allow_list: AllowList,
}

impl CaptureConfig {
    pub fn new<P, I, S>(log_dir: P, allowed_hosts: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            log_dir: log_dir.into(),
            allow_list: AllowList::new(allowed_hosts),
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfigFile::default().into()
    }
}

/// On-disk shape of the configuration; every field is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct CaptureConfigFile {
    log_dir: PathBuf,
    allowed_hosts: Vec<String>,
}

impl Default for CaptureConfigFile {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl From<CaptureConfigFile> for CaptureConfig {
    fn from(file: CaptureConfigFile) -> Self {
        CaptureConfig::new(file.log_dir, file.allowed_hosts)
    }
}

pub fn create_default_config() -> CaptureConfig {
    CaptureConfig::default()
}

/// Load a JSON configuration file, e.g.
/// `{"log_dir": "/var/log/capture", "allowed_hosts": ["httpbin.org"]}`
pub fn load_config_from_json(path: &Path) -> anyhow::Result<CaptureConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read capture config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid capture config {}", path.display()))?;
    Ok(config)
}

pub fn create_plugin(config: CaptureConfig) -> CapturePlugin {
    CapturePlugin::new(config)
}
