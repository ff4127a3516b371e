//! Proxy engine hooks
//!
//! The host proxy drives capture through these callbacks, one hook object per
//! exchange. None of them can fail or alter the traffic: requests and chunks
//! always come back exactly as they went in.

use crate::capture::{AssemblerState, CaptureSession};
use crate::models::ParsedRequest;
use bytes::Bytes;

/// Callbacks a proxy engine invokes over the lifetime of one exchange.
pub trait ProxyHooks: Send {
    /// Called once the request is parsed, before the upstream connection opens.
    fn before_upstream_connection(&mut self, request: ParsedRequest) -> ParsedRequest;

    /// Called with the client request before it is forwarded upstream.
    fn handle_client_request(&mut self, request: ParsedRequest) -> ParsedRequest {
        request
    }

    /// Called for every chunk read from the upstream connection.
    fn handle_upstream_chunk(&mut self, chunk: Bytes) -> Bytes;

    /// Called when the upstream connection closes.
    fn on_upstream_connection_close(&mut self) {}
}

impl ProxyHooks for CaptureSession {
    fn before_upstream_connection(&mut self, request: ParsedRequest) -> ParsedRequest {
        if let Err(err) = self.begin(&request) {
            tracing::warn!(
                "Capture disabled for {} {}{}: {err}",
                request.method,
                request.host,
                request.path
            );
        }
        request
    }

    fn handle_upstream_chunk(&mut self, chunk: Bytes) -> Bytes {
        match self.consume(&chunk) {
            Ok(true) => {
                if let Some(path) = self.log_path() {
                    tracing::debug!("Response captured to {}", path.display());
                }
            }
            Ok(false) => {}
            Err(err) => tracing::warn!("Response capture stopped: {err}"),
        }
        chunk
    }

    fn on_upstream_connection_close(&mut self) {
        if let (Some(state), Some(path)) = (self.response_state(), self.log_path()) {
            if state != AssemblerState::Complete {
                tracing::debug!(
                    "Upstream closed before the response completed; {} has no response section",
                    path.display()
                );
            }
        }
    }
}
