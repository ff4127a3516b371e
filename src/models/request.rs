//! Parsed HTTP request
//!
//! The request as the proxy engine hands it to the capture hooks.

use crate::error::{CaptureError, Result};
use crate::models::{header_value, headers_from_httparse};

const MAX_HEADER_COUNT: usize = 128;

/// A fully parsed client request.
///
/// Headers keep their original order and spelling; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Destination host, without port
    pub host: String,
    /// Request method exactly as sent (e.g. "GET")
    pub method: String,
    /// Request target in origin form (path plus query)
    pub path: String,
    /// Protocol version (e.g. "HTTP/1.1")
    pub version: String,
    /// Ordered header pairs
    pub headers: Vec<(String, String)>,
    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl ParsedRequest {
    /// Create an HTTP/1.1 request with no headers and no body
    pub fn new(host: &str, method: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header, keeping any existing header of the same name
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    /// Case-insensitive lookup of the first header with this name
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Parse a complete request (head plus any buffered body) from raw bytes.
    ///
    /// The host is taken from an absolute-form target when present (scheme
    /// matched case-insensitively), otherwise from the `Host` header. A request
    /// with neither is rejected whatever its version, since there is no host
    /// to gate on. Chunked bodies are decoded; otherwise a `Content-Length`
    /// shorter than the buffered bytes truncates the body.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADER_COUNT];
        let mut req = httparse::Request::new(&mut header_storage);
        let head_len = match req.parse(raw)? {
            httparse::Status::Complete(len) => len,
            httparse::Status::Partial => {
                return Err(CaptureError::Parse("partial HTTP request".to_string()))
            }
        };

        let method = req.method.unwrap_or("GET").to_string();
        let target = req.path.unwrap_or("/");
        let version = format!("HTTP/1.{}", req.version.unwrap_or(1));
        let headers = headers_from_httparse(req.headers);

        let (host, path) = if method.eq_ignore_ascii_case("CONNECT") {
            (strip_port(target).to_string(), target.to_string())
        } else if let Some((authority, path)) = split_absolute_target(target) {
            (strip_port(authority).to_string(), path.to_string())
        } else {
            let host = header_value(&headers, "host").ok_or_else(|| {
                CaptureError::Parse("origin-form request without Host header".to_string())
            })?;
            (strip_port(host).to_string(), target.to_string())
        };

        let is_chunked = header_value(&headers, "transfer-encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false);
        let body = if is_chunked {
            decode_chunked(&raw[head_len..])?
        } else {
            let mut body = raw[head_len..].to_vec();
            if let Some(len) =
                header_value(&headers, "content-length").and_then(|v| v.trim().parse().ok())
            {
                body.truncate(len);
            }
            body
        };

        Ok(Self {
            host,
            method,
            path,
            version,
            headers,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}

/// Decode a complete chunked body; trailers are dropped.
fn decode_chunked(mut raw: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let (consumed, size) = match httparse::parse_chunk_size(raw) {
            Ok(httparse::Status::Complete(parsed)) => parsed,
            Ok(httparse::Status::Partial) => {
                return Err(CaptureError::Parse("partial chunked request body".to_string()))
            }
            Err(_) => return Err(CaptureError::Parse("invalid chunk size".to_string())),
        };
        raw = &raw[consumed..];
        if size == 0 {
            return Ok(body);
        }

        let size = usize::try_from(size)
            .ok()
            .filter(|size| size.checked_add(2).map_or(false, |end| raw.len() >= end))
            .ok_or_else(|| CaptureError::Parse("partial chunked request body".to_string()))?;
        if &raw[size..size + 2] != b"\r\n" {
            return Err(CaptureError::Parse("invalid chunk terminator".to_string()));
        }
        body.extend_from_slice(&raw[..size]);
        raw = &raw[size + 2..];
    }
}

fn split_absolute_target(target: &str) -> Option<(&str, &str)> {
    let scheme_end = target.find("://")?;
    let scheme = &target[..scheme_end];
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return None;
    }
    let rest = &target[scheme_end + 3..];
    match rest.find(|c: char| c == '/' || c == '?') {
        Some(pos) => Some((&rest[..pos], &rest[pos..])),
        None => Some((rest, "/")),
    }
}

/// Remove a trailing `:port` from an authority, respecting bracketed IPv6 literals.
pub(crate) fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }

    match authority.rfind(':') {
        Some(pos)
            if !authority[..pos].contains(':')
                && !authority[pos + 1..].is_empty()
                && authority[pos + 1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            &authority[..pos]
        }
        _ => authority,
    }
}
