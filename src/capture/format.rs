//! Text rendering shared by the request and response sections.

use crate::error::{CaptureError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;

const JSON_INDENT: &[u8] = b"    ";

/// Append `"<Name>: <Value>\n"` for every header, in order
pub fn push_header_lines(out: &mut String, headers: &[(String, String)]) {
    for (name, value) in headers {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
}

/// Decode bytes as UTF-8, falling back to a lossy decode for invalid input.
pub fn decode_text<'a>(what: &'static str, bytes: &'a [u8]) -> Cow<'a, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let err = CaptureError::Encoding {
                what,
                len: bytes.len(),
            };
            tracing::debug!("{err}; writing lossy text");
            String::from_utf8_lossy(bytes)
        }
    }
}

/// Re-serialize a JSON document with sorted keys and 4-space indentation.
///
/// Numbers are written with the digits the document carried.
pub fn pretty_json(text: &str) -> Result<String> {
    let value: Value = serde_json::from_str(text)?;
    let mut out = Vec::with_capacity(text.len() * 2);
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(JSON_INDENT));
    sort_keys(value).serialize(&mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
