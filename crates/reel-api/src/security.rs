//! Outbound URL checks.
//!
//! The encoder fetches the soundtrack itself, so a caller-supplied music URL
//! must not point at loopback, private networks or cloud metadata endpoints.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::{Host, Url};

/// Maximum URL length to prevent DoS attacks.
pub const MAX_URL_LENGTH: usize = 2048;

/// Blocked URL patterns (sensitive endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://localhost",
        r"^https?://[^/]*\.localhost(:|/|$)",
        r"^https?://[^/]*\.internal(:|/|$)",
        r"^https?://metadata\.",
        r"^https?://metadata\.google\.internal",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Validate a soundtrack URL, returning the trimmed URL.
pub fn validate_music_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    if url.is_empty() {
        return Err("Music URL cannot be empty".to_string());
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(format!(
            "Music URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        ));
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid music URL: {}", e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("Music URL must use http or https".to_string());
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err("Music URL must not carry credentials".to_string());
    }

    let lowered = url.to_ascii_lowercase();
    if BLOCKED_PATTERNS.iter().any(|p| p.is_match(&lowered)) {
        warn!(url = %url, "Blocked music URL");
        return Err("Music URL points to a blocked host".to_string());
    }

    let blocked_ip = match parsed.host() {
        Some(Host::Ipv4(ip)) => is_blocked_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_blocked_ip(IpAddr::V6(ip)),
        Some(Host::Domain(_)) => false,
        None => return Err("Music URL must have a host".to_string()),
    };
    if blocked_ip {
        warn!(url = %url, "Blocked music URL with internal address");
        return Err("Music URL points to a blocked host".to_string());
    }

    Ok(url.to_string())
}

fn is_blocked_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_blocked_v4(v4),
            None => is_blocked_v6(v6),
        },
    }
}

fn is_blocked_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // carrier-grade NAT, 100.64.0.0/10
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_blocked_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}
