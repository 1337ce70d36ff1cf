//! URL checks applied before anything is fetched.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

use crate::error::FetchError;

/// Hostname suffixes that only resolve inside private networks.
const FORBIDDEN_SUFFIXES: &[&str] = &[
    ".local",
    ".localhost",
    ".internal",
    ".intranet",
    ".corp",
    ".home",
    ".lan",
];

/// Parse `raw` and check that it is safe to fetch.
///
/// Only http and https are accepted. Unless `allow_private` is set, hosts
/// that resolve to loopback, private or link-local ranges are rejected too.
pub fn validate_url(raw: &str, allow_private: bool) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported URL scheme: {scheme}"
            )))
        }
    }

    if url.host().is_none() {
        return Err(FetchError::InvalidUrl("URL has no host".to_string()));
    }

    if !allow_private {
        check_host(&url)?;
    }

    Ok(url)
}

/// Reject URLs whose host points into a private network.
pub fn check_host(url: &Url) -> Result<(), FetchError> {
    match url.host() {
        Some(Host::Domain(domain)) if is_forbidden_hostname(domain) => Err(
            FetchError::InvalidUrl(format!("forbidden host: {domain}")),
        ),
        Some(Host::Ipv4(ip)) if is_private_ip(&IpAddr::V4(ip)) => Err(FetchError::InvalidUrl(
            format!("private IP address not allowed: {ip}"),
        )),
        Some(Host::Ipv6(ip)) if is_private_ip(&IpAddr::V6(ip)) => Err(FetchError::InvalidUrl(
            format!("private IP address not allowed: {ip}"),
        )),
        Some(_) => Ok(()),
        None => Err(FetchError::InvalidUrl("URL has no host".to_string())),
    }
}

fn is_forbidden_hostname(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let host = host.trim_end_matches('.');

    host == "localhost" || FORBIDDEN_SUFFIXES.iter().any(|s| host.ends_with(s))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_v4(&v4),
            None => is_private_v6(v6),
        },
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    if ip.is_loopback() || ip.is_private() || ip.is_link_local() {
        return true;
    }
    if ip.is_broadcast() || ip.is_unspecified() || ip.is_documentation() {
        return true;
    }

    // Carrier-grade NAT: 100.64.0.0/10
    let [a, b, _, _] = ip.octets();
    a == 100 && (b & 0xc0) == 64
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];

    ip.is_loopback()
        || ip.is_unspecified()
        // Unique local: fc00::/7
        || (first & 0xfe00) == 0xfc00
        // Link-local: fe80::/10
        || (first & 0xffc0) == 0xfe80
}
