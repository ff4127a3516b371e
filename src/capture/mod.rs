//! Full request/response capture
//!
//! This module contains the capture pipeline: the allow-list gate, the
//! per-exchange log artifact, the request recorder and the response assembler,
//! tied together by [`CaptureSession`].

pub mod allow_list;
pub mod assembler;
pub mod format;
pub mod log_target;
pub mod recorder;
pub mod session;

pub use allow_list::AllowList;
pub use assembler::{AssemblerState, ResponseAssembler, RESPONSE_DELIMITER};
pub use log_target::ExchangeLogTarget;
pub use session::CaptureSession;

use crate::api::capture_api::CaptureConfig;
use std::sync::Arc;

/// Process-wide capture plugin.
///
/// Holds the immutable configuration and mints one session per exchange.
/// Cloning is cheap; every clone shares the same configuration.
#[derive(Debug, Clone)]
pub struct CapturePlugin {
    config: Arc<CaptureConfig>,
}

impl CapturePlugin {
    pub fn new(config: CaptureConfig) -> Self {
        tracing::info!(
            "Capture plugin writing to {} for {} allow-listed host(s)",
            config.log_dir.display(),
            config.allow_list().len()
        );
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Fresh session for a new exchange
    pub fn session(&self) -> CaptureSession {
        CaptureSession::new(Arc::clone(&self.config))
    }
}
