//! Data models for captured exchanges
//!
//! Parsed requests come from the host proxy; parsed responses are snapshots
//! taken from the incremental parser once it reports completion.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

/// Case-insensitive lookup of the first header with the given name
pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub(crate) fn headers_from_httparse(headers: &[httparse::Header]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|h| {
            let name = h.name.to_string();
            let value = String::from_utf8_lossy(h.value).to_string();
            (name, value)
        })
        .collect()
}
