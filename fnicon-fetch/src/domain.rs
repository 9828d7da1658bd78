//! Registrable-domain approximation.

use std::net::IpAddr;

/// Returns the last two dot-separated labels of `host`.
///
/// Hosts with two labels or fewer, and IP addresses, are returned whole.
/// This is a plain label count, not a public-suffix lookup, so
/// `www.example.co.uk` yields `co.uk`.
pub fn registrable_domain(host: &str) -> &str {
    let host = host.trim_end_matches('.');
    if host.parse::<IpAddr>().is_ok() || host.starts_with('[') {
        return host;
    }

    match host.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &host[idx + 1..],
        None => host,
    }
}
