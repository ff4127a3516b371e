//! Parsed HTTP response
//!
//! Snapshot of a response taken once the incremental parser reports that the
//! whole message has been read.

use crate::models::header_value;
use crate::parser::ResponseParser;

/// A fully assembled upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Protocol version (e.g. "HTTP/1.1")
    pub version: String,
    /// HTTP status code
    pub status_code: u16,
    /// Reason phrase, possibly empty
    pub reason: String,
    /// Ordered header pairs
    pub headers: Vec<(String, String)>,
    /// Decoded body (chunked framing removed), if any
    pub body: Option<Vec<u8>>,
}

impl ParsedResponse {
    /// Snapshot a parser that has reached completion.
    ///
    /// Returns `None` while the parser is still waiting for bytes.
    pub fn from_parser<P>(parser: &P) -> Option<Self>
    where
        P: ResponseParser + ?Sized,
    {
        if !parser.is_complete() {
            return None;
        }

        Some(Self {
            version: parser.version()?.to_string(),
            status_code: parser.status_code()?,
            reason: parser.reason().unwrap_or("").to_string(),
            headers: parser.headers().to_vec(),
            body: parser.body().map(|b| b.to_vec()),
        })
    }

    /// Case-insensitive lookup of the first header with this name
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}
