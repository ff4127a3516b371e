//! Error types for the capture pipeline.
//!
//! None of these ever reach the proxied data path. The session logs them and
//! stops capturing; the exchange itself carries on untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Capture error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The log directory or artifact file could not be created.
    #[error("cannot create capture artifact at {}: {source}", path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes that should be text are not valid UTF-8.
    #[error("{what} is not valid UTF-8 ({len} bytes)")]
    Encoding { what: &'static str, len: usize },

    /// Body declared as `application/json` did not parse.
    #[error("body declared as JSON does not parse: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Appending to the artifact failed.
    #[error("failed to append to capture artifact: {0}")]
    Write(#[from] std::io::Error),

    /// The upstream bytes are not a well-formed HTTP/1.x response.
    #[error("malformed upstream response: {0}")]
    Parse(String),
}

impl From<httparse::Error> for CaptureError {
    fn from(err: httparse::Error) -> Self {
        CaptureError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
