//! Incremental HTTP response parsing
//!
//! The capture pipeline only needs a parser it can feed arbitrary slices of
//! upstream bytes and ask "are we done yet?". `ResponseParser` is that seam;
//! `Http1ResponseParser` is the HTTP/1.x implementation used by sessions.

mod http1;

pub use http1::Http1ResponseParser;

use crate::error::Result;

/// Progress of an incremental parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Status line and headers not yet complete
    Head,
    /// Headers read, body still arriving
    Body,
    /// Whole response read
    Complete,
}

/// Incremental response parser fed by the transport as bytes arrive.
///
/// Accessors return `None` until the corresponding part has been parsed.
pub trait ResponseParser: Send {
    /// Feed the next slice of upstream bytes
    fn feed(&mut self, data: &[u8]) -> Result<ParseState>;

    /// Current progress
    fn state(&self) -> ParseState;

    fn is_complete(&self) -> bool {
        self.state() == ParseState::Complete
    }

    /// Protocol version, e.g. "HTTP/1.1"
    fn version(&self) -> Option<&str>;

    fn status_code(&self) -> Option<u16>;

    fn reason(&self) -> Option<&str>;

    /// Headers in the order received
    fn headers(&self) -> &[(String, String)];

    /// Body bytes read so far; `None` when empty
    fn body(&self) -> Option<&[u8]>;
}
