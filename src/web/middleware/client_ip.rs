//! Client address resolution.
//!
//! The socket peer is the client unless it is a configured trusted proxy.
//! Only then are `X-Forwarded-For` and `X-Real-IP` consulted, walking the
//! forwarded chain from the right and skipping further trusted hops.

use axum::{
    extract::ConnectInfo,
    http::{Extensions, HeaderMap},
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

/// Reverse proxies whose forwarding headers are believed.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpAddr>>);

impl TrustedProxies {
    pub fn new(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        Self(Arc::new(proxies.into_iter().collect()))
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.0.contains(&ip)
    }

    /// Resolve the client IP for a request. `None` when there is no peer
    /// address to start from.
    pub fn client_ip(&self, headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
        let peer = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())?;
        if !self.contains(peer) {
            return Some(peer.to_string());
        }

        let hops: Vec<&str> = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .collect();
        for hop in hops.into_iter().rev() {
            match hop.trim().parse::<IpAddr>() {
                Ok(ip) if self.contains(ip) => continue,
                Ok(ip) => return Some(ip.to_string()),
                Err(_) => break,
            }
        }

        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
            .or(Some(peer))
            .map(|ip| ip.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(peer: &str, headers: &[(&'static str, &str)]) -> (HeaderMap, Extensions) {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, value.parse().unwrap());
        }
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(format!("{peer}:40000").parse::<SocketAddr>().unwrap()));
        (map, extensions)
    }

    fn proxies() -> TrustedProxies {
        TrustedProxies::new([
            "10.0.0.1".parse::<IpAddr>().unwrap(),
            "10.0.0.2".parse::<IpAddr>().unwrap(),
        ])
    }

    #[test]
    fn test_no_peer() {
        assert_eq!(
            proxies().client_ip(&HeaderMap::new(), &Extensions::new()),
            None
        );
    }

    #[test]
    fn test_untrusted_peer_ignores_headers() {
        let (headers, ext) = request(
            "198.51.100.7",
            &[("x-forwarded-for", "203.0.113.5"), ("x-real-ip", "203.0.113.6")],
        );
        assert_eq!(
            proxies().client_ip(&headers, &ext).as_deref(),
            Some("198.51.100.7")
        );
        assert_eq!(
            TrustedProxies::default().client_ip(&headers, &ext).as_deref(),
            Some("198.51.100.7")
        );
    }

    #[test]
    fn test_trusted_peer_uses_rightmost_untrusted_hop() {
        let (headers, ext) = request(
            "10.0.0.1",
            &[("x-forwarded-for", "1.2.3.4, 203.0.113.5, 10.0.0.2")],
        );
        assert_eq!(
            proxies().client_ip(&headers, &ext).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn test_trusted_peer_fallbacks() {
        let (headers, ext) = request("10.0.0.1", &[("x-real-ip", "203.0.113.9")]);
        assert_eq!(
            proxies().client_ip(&headers, &ext).as_deref(),
            Some("203.0.113.9")
        );

        let (headers, ext) = request("10.0.0.1", &[("x-forwarded-for", "garbage")]);
        assert_eq!(proxies().client_ip(&headers, &ext).as_deref(), Some("10.0.0.1"));
    }
}
