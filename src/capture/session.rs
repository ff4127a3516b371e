//! Capture session: the per-exchange state bundle
//!
//! A session is created for every exchange, decides once whether the exchange
//! is captured, and owns the artifact handle and response assembler for the
//! exchange's lifetime. Disabled sessions hold no capture state at all.

use crate::api::capture_api::CaptureConfig;
use crate::capture::assembler::{AssemblerState, ResponseAssembler};
use crate::capture::log_target::ExchangeLogTarget;
use crate::capture::recorder;
use crate::error::Result;
use crate::models::ParsedRequest;
use crate::parser::Http1ResponseParser;
use chrono::{DateTime, Local};
use std::path::Path;
use std::sync::Arc;

struct ActiveCapture {
    target: ExchangeLogTarget,
    assembler: ResponseAssembler<Http1ResponseParser>,
}

pub struct CaptureSession {
    config: Arc<CaptureConfig>,
    decided: bool,
    active: Option<ActiveCapture>,
}

impl CaptureSession {
    pub fn new(config: Arc<CaptureConfig>) -> Self {
        Self {
            config,
            decided: false,
            active: None,
        }
    }

    /// Gate the exchange and, when allow-listed, create the artifact and write
    /// the REQUEST section.
    ///
    /// Returns whether capture is active. Only the first call decides; later
    /// calls return the existing decision. On error the session stays disabled.
    pub fn begin(&mut self, request: &ParsedRequest) -> Result<bool> {
        self.begin_at(request, Local::now())
    }

    /// [`CaptureSession::begin`] with an explicit artifact timestamp
    pub fn begin_at(
        &mut self,
        request: &ParsedRequest,
        timestamp: DateTime<Local>,
    ) -> Result<bool> {
        if self.decided {
            return Ok(self.is_enabled());
        }
        self.decided = true;

        if !self.config.allow_list().decide(&request.host) {
            return Ok(false);
        }

        let mut target = ExchangeLogTarget::open_for_request(
            &self.config.log_dir,
            &request.host,
            &request.method,
            &request.path,
            timestamp,
        )?;
        recorder::record(&mut target, request)?;

        tracing::info!(
            "Capturing {} {} {} to {}",
            request.method,
            request.host,
            request.path,
            target.path().display()
        );
        self.active = Some(ActiveCapture {
            target,
            assembler: ResponseAssembler::new(Http1ResponseParser::for_request_method(
                &request.method,
            )),
        });
        Ok(true)
    }

    /// Route one upstream chunk through the response assembler.
    ///
    /// No-op for disabled sessions. Returns `Ok(true)` when this chunk
    /// completed the response and the RESPONSE section was written.
    pub fn consume(&mut self, chunk: &[u8]) -> Result<bool> {
        match self.active.as_mut() {
            Some(active) => active.assembler.consume(chunk, &mut active.target),
            None => Ok(false),
        }
    }

    /// Whether full capture is active for this exchange
    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    /// Artifact path; present iff capture is enabled
    pub fn log_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.target.path())
    }

    /// Assembler progress; `None` for disabled sessions
    pub fn response_state(&self) -> Option<AssemblerState> {
        self.active.as_ref().map(|a| a.assembler.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use std::fs;

    fn config_in(dir: &Path) -> Arc<CaptureConfig> {
        Arc::new(CaptureConfig::new(dir.join("logs"), ["httpbin.org"]))
    }

    const RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\nContent-Length: 5\r\n\r\nhello";

    #[test]
    fn disallowed_host_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));

        let request = ParsedRequest::new("example.com", "GET", "/");
        assert!(!session.begin(&request).unwrap());
        assert!(!session.consume(RESPONSE).unwrap());

        assert!(session.log_path().is_none());
        assert!(session.response_state().is_none());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn request_section_is_written_at_begin() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));

        let request =
            ParsedRequest::new("httpbin.org", "GET", "/status").with_header("X-Test", "1");
        assert!(session.begin(&request).unwrap());
        let path = session.log_path().unwrap().to_path_buf();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "GET /status HTTP/1.1\nX-Test: 1\n"
        );
        assert_eq!(session.response_state(), Some(AssemblerState::Idle));

        assert!(session.consume(RESPONSE).unwrap());
        assert_eq!(session.response_state(), Some(AssemblerState::Complete));
    }

    #[test]
    fn only_the_first_begin_decides() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));

        assert!(!session
            .begin(&ParsedRequest::new("example.com", "GET", "/"))
            .unwrap());
        assert!(!session
            .begin(&ParsedRequest::new("httpbin.org", "GET", "/"))
            .unwrap());
        assert!(!session.is_enabled());
    }

    #[test]
    fn configuration_error_leaves_session_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logs"), b"in the way").unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));

        let err = session
            .begin(&ParsedRequest::new("httpbin.org", "GET", "/"))
            .unwrap_err();
        assert!(matches!(err, CaptureError::Configuration { .. }));
        assert!(!session.is_enabled());
        assert!(!session.consume(RESPONSE).unwrap());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_request_write_disables_capture() {
        use crate::capture::log_target::artifact_name;
        use crate::proxy::ProxyHooks;
        use bytes::Bytes;
        use chrono::TimeZone;

        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        let name = format!("{}.log", artifact_name("httpbin.org", "GET", "/full", at));
        std::os::unix::fs::symlink("/dev/full", logs.join(name)).unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));

        let err = session
            .begin_at(&ParsedRequest::new("httpbin.org", "GET", "/full"), at)
            .unwrap_err();
        assert!(matches!(err, CaptureError::Write(_)));
        assert!(!session.is_enabled());
        assert!(session.response_state().is_none());

        let chunk = Bytes::from_static(RESPONSE);
        assert_eq!(session.handle_upstream_chunk(chunk.clone()), chunk);
    }

    #[test]
    fn head_request_response_completes_without_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = CaptureSession::new(config_in(dir.path()));
        session
            .begin(&ParsedRequest::new("httpbin.org", "HEAD", "/get"))
            .unwrap();

        assert!(session
            .consume(b"HTTP/1.1 200 OK\r\nContent-Length: 42\r\n\r\n")
            .unwrap());
        let written = fs::read_to_string(session.log_path().unwrap()).unwrap();
        assert!(written.ends_with("HTTP/1.1 200 OK\nContent-Length: 42\n\n"));
    }
}
