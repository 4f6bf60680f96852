use axum::http::HeaderMap;
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

/// Proxy headers consulted for the client address, in priority order
const FORWARDING_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Client IP for a request.
///
/// Forwarding headers are only believed when the TCP peer is one of
/// `trusted_proxies`; anyone else gets judged by the peer address.
/// `X-Forwarded-For` may list a chain of proxies; the first entry is the
/// original client.
pub fn extract_real_ip(
    headers: &HeaderMap,
    connect_info: &SocketAddr,
    trusted_proxies: &HashSet<IpAddr>,
) -> IpAddr {
    let peer = connect_info.ip();
    if !trusted_proxies.contains(&peer) {
        return peer;
    }

    FORWARDING_HEADERS
        .iter()
        .find_map(|name| header_ip(headers, name))
        .unwrap_or(peer)
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}
