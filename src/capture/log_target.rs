//! Per-exchange log artifact
//!
//! Artifacts are named `<DD.MM.YYYY-HHmmss> - <host> - <METHOD> <path>.log`
//! with every `/` in the path replaced by `|`, so the whole identifier stays
//! a single path segment.

use crate::error::{CaptureError, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y-%H%M%S";
const PATH_SEPARATOR_REPLACEMENT: &str = "|";

/// Build the artifact identifier for an exchange (without the `.log` extension)
pub fn artifact_name(host: &str, method: &str, path: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "{} - {} - {} {}",
        timestamp.format(TIMESTAMP_FORMAT),
        host,
        method,
        path.replace('/', PATH_SEPARATOR_REPLACEMENT)
    )
}

/// Append-only write channel to one exchange's artifact.
#[derive(Debug)]
pub struct ExchangeLogTarget {
    path: PathBuf,
    file: File,
}

impl ExchangeLogTarget {
    /// Create (or truncate) the artifact for an allow-listed exchange.
    ///
    /// The log directory is created if missing.
    pub fn open_for_request(
        log_dir: &Path,
        host: &str,
        method: &str,
        path: &str,
        timestamp: DateTime<Local>,
    ) -> Result<Self> {
        fs::create_dir_all(log_dir).map_err(|source| CaptureError::Configuration {
            path: log_dir.to_path_buf(),
            source,
        })?;

        let path = log_dir.join(format!(
            "{}.log",
            artifact_name(host, method, path, timestamp)
        ));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| CaptureError::Configuration {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Opened capture artifact {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append bytes and flush them to the file
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        Ok(())
    }
}
