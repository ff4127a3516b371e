//! Request section of the artifact

use crate::capture::format::{decode_text, push_header_lines};
use crate::capture::log_target::ExchangeLogTarget;
use crate::error::Result;
use crate::models::ParsedRequest;

/// Render the request line, headers and optional body.
pub fn format_request(request: &ParsedRequest) -> String {
    let mut out = format!("{} {} {}\n", request.method, request.path, request.version);
    push_header_lines(&mut out, &request.headers);
    if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
        out.push('\n');
        out.push_str(&decode_text("request body", body));
    }
    out
}

/// Write the request section with a single append
pub fn record(target: &mut ExchangeLogTarget, request: &ParsedRequest) -> Result<()> {
    target.append(format_request(request).as_bytes())
}
