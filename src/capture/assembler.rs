//! Response assembler
//!
//! Feeds upstream chunks to an incremental parser and, the first time the
//! parser reports a complete response, appends the RESPONSE section to the
//! exchange artifact. Correctness does not depend on how the transport slices
//! the bytes: nothing is written until the whole response has been parsed.

use crate::capture::format::{decode_text, pretty_json, push_header_lines};
use crate::capture::log_target::ExchangeLogTarget;
use crate::error::Result;
use crate::models::ParsedResponse;
use crate::parser::{Http1ResponseParser, ResponseParser};

/// Separator written between the REQUEST and RESPONSE sections
pub const RESPONSE_DELIMITER: &str = "\n=== BEGIN RESPONSE ===\n\n";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Lifecycle of a response assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No bytes consumed yet
    Idle,
    /// At least one chunk consumed, response not complete
    Accumulating,
    /// Response section written; further chunks are ignored
    Complete,
    /// Parsing or writing failed; capture stopped for this exchange
    Failed,
}

pub struct ResponseAssembler<P = Http1ResponseParser> {
    parser: P,
    state: AssemblerState,
}

impl<P: ResponseParser> ResponseAssembler<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            state: AssemblerState::Idle,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Consume one chunk of upstream bytes.
    ///
    /// Returns `Ok(true)` for the chunk that completed the response and caused
    /// the RESPONSE section to be appended. Errors move the assembler to
    /// [`AssemblerState::Failed`].
    pub fn consume(&mut self, chunk: &[u8], target: &mut ExchangeLogTarget) -> Result<bool> {
        if matches!(
            self.state,
            AssemblerState::Complete | AssemblerState::Failed
        ) {
            return Ok(false);
        }
        self.state = AssemblerState::Accumulating;

        if let Err(err) = self.parser.feed(chunk) {
            self.state = AssemblerState::Failed;
            return Err(err);
        }

        let response = match ParsedResponse::from_parser(&self.parser) {
            Some(response) => response,
            None => return Ok(false),
        };

        match target.append(format_response(&response).as_bytes()) {
            Ok(()) => {
                self.state = AssemblerState::Complete;
                Ok(true)
            }
            Err(err) => {
                self.state = AssemblerState::Failed;
                Err(err)
            }
        }
    }
}

/// Render the RESPONSE section, delimiter included.
///
/// The body section is always introduced by a blank line, so a response
/// without a body ends with `"\n\n"` after its last header.
pub fn format_response(response: &ParsedResponse) -> String {
    let mut out = String::from(RESPONSE_DELIMITER);
    out.push_str(&format!(
        "{} {} {}\n",
        response.version, response.status_code, response.reason
    ));
    push_header_lines(&mut out, &response.headers);
    out.push('\n');
    if let Some(body) = response.body.as_deref() {
        out.push_str(&format_body(response, body));
    }
    out
}

fn format_body(response: &ParsedResponse, body: &[u8]) -> String {
    let text = decode_text("response body", body);
    if is_json(response) {
        match pretty_json(&text) {
            Ok(pretty) => return pretty,
            Err(err) => tracing::warn!("{err}; writing raw body"),
        }
    }
    text.into_owned()
}

fn is_json(response: &ParsedResponse) -> bool {
    response
        .header("content-type")
        .map(|v| v.to_ascii_lowercase().contains(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}
