//! Allow-list gate deciding which exchanges get full capture.

use crate::models::request::strip_port;
use std::collections::HashSet;

/// Immutable set of destination hosts that get full capture.
///
/// Entries and looked-up hosts go through [`normalize_host`], so `HTTPBIN.org`,
/// `httpbin.org:443` and `httpbin.org.` all match an entry of `httpbin.org`.
/// Matching is exact after normalization; subdomains are not implied.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    hosts: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| normalize_host(h.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Whether full capture is enabled for an exchange with this destination host
    pub fn decide(&self, host: &str) -> bool {
        self.hosts.contains(&normalize_host(host))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Canonical form used for allow-list comparison: port stripped, trailing dot
/// removed, ASCII-lowercased.
pub fn normalize_host(host: &str) -> String {
    let host = strip_port(host.trim());
    host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase()
}
