//! HTTP/1.x response parser built on `httparse`
//!
//! Bytes are buffered until the head parses, then the body is framed by
//! `Transfer-Encoding: chunked` or `Content-Length`. Chunked bodies are stored
//! decoded; trailers are read and dropped.

use crate::error::{CaptureError, Result};
use crate::models::{header_value, headers_from_httparse};
use crate::parser::{ParseState, ResponseParser};

const MAX_HEADER_BYTES: usize = 64 * 1024;
const MAX_HEADER_COUNT: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Head,
    FixedLength { remaining: u64 },
    ChunkSize,
    ChunkData { remaining: u64 },
    ChunkTerminator,
    Trailers,
    /// No length information: the body runs until the upstream closes,
    /// so the parser never reports completion on its own.
    UntilClose,
    Done,
}

#[derive(Debug)]
struct ResponseHead {
    version: String,
    status_code: u16,
    reason: String,
    headers: Vec<(String, String)>,
}

/// Incremental HTTP/1.x response parser
#[derive(Debug)]
pub struct Http1ResponseParser {
    framing: Framing,
    buffer: Vec<u8>,
    head: Option<ResponseHead>,
    body: Vec<u8>,
    head_request: bool,
}

impl Default for Http1ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Http1ResponseParser {
    pub fn new() -> Self {
        Self {
            framing: Framing::Head,
            buffer: Vec::new(),
            head: None,
            body: Vec::new(),
            head_request: false,
        }
    }

    /// Parser for the response to a request sent with `method`.
    ///
    /// Responses to `HEAD` carry no body whatever their headers say.
    pub fn for_request_method(method: &str) -> Self {
        Self {
            head_request: method.eq_ignore_ascii_case("HEAD"),
            ..Self::new()
        }
    }

    /// Run the state machine until it needs more bytes.
    fn step(&mut self) -> Result<bool> {
        match self.framing {
            Framing::Head => self.parse_head(),
            Framing::FixedLength { remaining } => {
                let remaining = self.take_body(remaining);
                self.framing = if remaining == 0 {
                    Framing::Done
                } else {
                    Framing::FixedLength { remaining }
                };
                Ok(remaining == 0)
            }
            Framing::ChunkSize => match httparse::parse_chunk_size(&self.buffer) {
                Ok(httparse::Status::Complete((consumed, size))) => {
                    self.buffer.drain(..consumed);
                    self.framing = if size == 0 {
                        Framing::Trailers
                    } else {
                        Framing::ChunkData { remaining: size }
                    };
                    Ok(true)
                }
                Ok(httparse::Status::Partial) => Ok(false),
                Err(_) => Err(CaptureError::Parse("invalid chunk size".to_string())),
            },
            Framing::ChunkData { remaining } => {
                let remaining = self.take_body(remaining);
                if remaining == 0 {
                    self.framing = Framing::ChunkTerminator;
                    Ok(true)
                } else {
                    self.framing = Framing::ChunkData { remaining };
                    Ok(false)
                }
            }
            Framing::ChunkTerminator => {
                if self.buffer.len() < 2 {
                    return Ok(false);
                }
                if &self.buffer[..2] != b"\r\n" {
                    return Err(CaptureError::Parse("invalid chunk terminator".to_string()));
                }
                self.buffer.drain(..2);
                self.framing = Framing::ChunkSize;
                Ok(true)
            }
            Framing::Trailers => match find_crlf(&self.buffer) {
                Some(0) => {
                    self.buffer.clear();
                    self.framing = Framing::Done;
                    Ok(false)
                }
                Some(pos) => {
                    self.buffer.drain(..pos + 2);
                    Ok(true)
                }
                None => Ok(false),
            },
            Framing::UntilClose => {
                self.body.append(&mut self.buffer);
                Ok(false)
            }
            Framing::Done => {
                self.buffer.clear();
                Ok(false)
            }
        }
    }

    /// Move up to `remaining` buffered bytes into the body and return what is left.
    fn take_body(&mut self, remaining: u64) -> u64 {
        let take = remaining.min(self.buffer.len() as u64) as usize;
        self.body.extend(self.buffer.drain(..take));
        remaining - take as u64
    }

    fn parse_head(&mut self) -> Result<bool> {
        let parsed = {
            let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADER_COUNT];
            let mut res = httparse::Response::new(&mut header_storage);
            match res.parse(&self.buffer)? {
                httparse::Status::Partial => None,
                httparse::Status::Complete(len) => Some((
                    len,
                    ResponseHead {
                        version: format!("HTTP/1.{}", res.version.unwrap_or(1)),
                        status_code: res.code.unwrap_or(500),
                        reason: res.reason.unwrap_or("").to_string(),
                        headers: headers_from_httparse(res.headers),
                    },
                )),
            }
        };

        let (head_len, head) = match parsed {
            Some(parsed) => parsed,
            None if self.buffer.len() > MAX_HEADER_BYTES => {
                return Err(CaptureError::Parse(
                    "HTTP headers exceed allowed size".to_string(),
                ))
            }
            None => return Ok(false),
        };
        self.buffer.drain(..head_len);

        if is_interim(head.status_code) {
            tracing::debug!("Skipping interim {} response", head.status_code);
            return Ok(true);
        }

        self.framing = self.body_framing(&head);
        self.head = Some(head);
        Ok(true)
    }

    fn body_framing(&self, head: &ResponseHead) -> Framing {
        let code = head.status_code;
        if self.head_request || (100..200).contains(&code) || code == 204 || code == 304 {
            return Framing::Done;
        }

        let is_chunked = header_value(&head.headers, "transfer-encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false);
        if is_chunked {
            return Framing::ChunkSize;
        }

        match header_value(&head.headers, "content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            Some(0) => Framing::Done,
            Some(len) => Framing::FixedLength { remaining: len },
            None => Framing::UntilClose,
        }
    }
}

impl ResponseParser for Http1ResponseParser {
    fn feed(&mut self, data: &[u8]) -> Result<ParseState> {
        if self.framing != Framing::Done {
            self.buffer.extend_from_slice(data);
            while self.step()? {}
        }
        Ok(self.state())
    }

    fn state(&self) -> ParseState {
        match self.framing {
            Framing::Head => ParseState::Head,
            Framing::Done => ParseState::Complete,
            _ => ParseState::Body,
        }
    }

    fn version(&self) -> Option<&str> {
        self.head.as_ref().map(|h| h.version.as_str())
    }

    fn status_code(&self) -> Option<u16> {
        self.head.as_ref().map(|h| h.status_code)
    }

    fn reason(&self) -> Option<&str> {
        self.head.as_ref().map(|h| h.reason.as_str())
    }

    fn headers(&self) -> &[(String, String)] {
        self.head.as_ref().map(|h| h.headers.as_slice()).unwrap_or(&[])
    }

    fn body(&self) -> Option<&[u8]> {
        if self.body.is_empty() {
            None
        } else {
            Some(&self.body)
        }
    }
}

/// 1xx responses other than 101 are followed by the real response.
fn is_interim(code: u16) -> bool {
    (100..200).contains(&code) && code != 101
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == b"\r\n")
}
