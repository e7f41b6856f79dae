//! Trusted proxy chain validation.
//!
//! The `X-Forwarded-For` chain lists the client first and then every proxy up
//! to the closest one; the transport peer is appended as the final hop. Each
//! configured whitelist describes one expected proxy hop, in chain order, so
//! the last `N` hops of the chain must fall in the `N` whitelists. The entry
//! just before them is the client as reported by the trusted proxies.
//!
//! ```text
//! X-Forwarded-For: client, proxy1        peer: proxy2
//! whitelists:      [proxy1 ranges], [proxy2 ranges]
//! ```

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;

use crate::error::{Error, Result};

/// Network ranges accepted for one proxy hop. Empty accepts any address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    ranges: Vec<IpNet>,
}

impl Whitelist {
    pub fn new(ranges: Vec<IpNet>) -> Self {
        Self { ranges }
    }

    /// A whitelist that accepts any address.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of CIDR ranges or bare addresses.
    ///
    /// `*` or an empty string yields a whitelist that accepts any address.
    pub fn parse(spec: &str) -> std::result::Result<Self, ipnet::AddrParseError> {
        let spec = spec.trim();
        if spec.is_empty() || spec == "*" {
            return Ok(Self::any());
        }

        let ranges = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match IpAddr::from_str(s) {
                Ok(addr) => Ok(IpNet::from(addr)),
                Err(_) => IpNet::from_str(s),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { ranges })
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[IpNet] {
        &self.ranges
    }

    /// Whether any range contains `addr`. False for an empty whitelist.
    pub fn matches(&self, addr: &IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(addr))
    }

    /// Whether `addr` is acceptable for this hop.
    pub fn admits(&self, addr: &IpAddr) -> bool {
        self.is_empty() || self.matches(addr)
    }
}

/// Parse one chain entry as an address, accepting `ip:port` and `[v6]:port`.
pub fn parse_hop(entry: &str) -> Option<IpAddr> {
    let entry = entry.trim();
    IpAddr::from_str(entry)
        .ok()
        .or_else(|| SocketAddr::from_str(entry).ok().map(|sock| sock.ip()))
}

/// Build the full chain: non-empty `X-Forwarded-For` entries, then the peer.
pub fn build_chain<'a>(forwarded_for: &'a str, peer: &'a str) -> Vec<&'a str> {
    forwarded_for
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .chain(std::iter::once(peer.trim()))
        .collect()
}

/// Determine the effective client address for a request.
///
/// `forwarded_for` is the raw `X-Forwarded-For` value (empty when absent) and
/// `peer` the transport-level peer address.
pub fn effective_client(
    forwarded_for: &str,
    peer: &str,
    whitelists: &[Whitelist],
) -> Result<IpAddr> {
    let chain = build_chain(forwarded_for, peer);

    // A load balancer health check arrives directly, with no forwarding.
    if let [only] = chain.as_slice()
        && let Some(first) = whitelists.first()
        && let Some(addr) = parse_hop(only)
        && first.matches(&addr)
    {
        return Ok(addr);
    }

    let proxies = whitelists.len();
    if chain.len() < proxies + 1 {
        return Err(Error::ProxyChainInvalid(format!(
            "expected at least {} hops, got {}",
            proxies + 1,
            chain.len()
        )));
    }

    let client_index = chain.len() - proxies - 1;
    for (whitelist, hop) in whitelists.iter().zip(&chain[client_index + 1..]) {
        if whitelist.is_empty() {
            continue;
        }
        let admitted = parse_hop(hop).is_some_and(|addr| whitelist.admits(&addr));
        if !admitted {
            return Err(Error::ProxyChainInvalid(format!(
                "untrusted proxy hop {hop}"
            )));
        }
    }

    let client = chain[client_index];
    parse_hop(client)
        .ok_or_else(|| Error::ProxyChainInvalid(format!("unparseable client address {client}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wl(spec: &str) -> Whitelist {
        Whitelist::parse(spec).unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_proxy_accepts_forwarded_client() {
        let whitelists = [wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("203.0.113.5", "10.0.0.1", &whitelists),
            Ok(ip("203.0.113.5"))
        );
    }

    #[test]
    fn test_single_proxy_rejects_untrusted_peer() {
        let whitelists = [wl("10.0.0.0/8")];
        assert!(matches!(
            effective_client("203.0.113.5", "8.8.8.8", &whitelists),
            Err(Error::ProxyChainInvalid(_))
        ));
    }

    #[test]
    fn test_health_check_from_load_balancer() {
        let whitelists = [wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("", "10.1.2.3", &whitelists),
            Ok(ip("10.1.2.3"))
        );
    }

    #[test]
    fn test_direct_request_from_outside_rejected() {
        let whitelists = [wl("10.0.0.0/8")];
        assert!(effective_client("", "8.8.8.8", &whitelists).is_err());
    }

    #[test]
    fn test_health_check_ignores_empty_first_whitelist() {
        // An empty whitelist does not match anything for the health check.
        let whitelists = [Whitelist::any()];
        assert!(effective_client("", "8.8.8.8", &whitelists).is_err());
    }

    #[test]
    fn test_spoofed_prefix_is_ignored() {
        // Client forged "1.1.1.1"; the proxy appended the real client address.
        let whitelists = [wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("1.1.1.1, 198.51.100.7", "10.0.0.1", &whitelists),
            Ok(ip("198.51.100.7"))
        );
    }

    #[test]
    fn test_two_proxies() {
        let whitelists = [wl("192.0.2.0/24"), wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("203.0.113.5, 192.0.2.10", "10.0.0.1", &whitelists),
            Ok(ip("203.0.113.5"))
        );
    }

    #[test]
    fn test_two_proxies_first_hop_untrusted() {
        let whitelists = [wl("192.0.2.0/24"), wl("10.0.0.0/8")];
        assert!(effective_client("203.0.113.5, 203.0.113.6", "10.0.0.1", &whitelists).is_err());
    }

    #[test]
    fn test_two_proxies_chain_too_short() {
        let whitelists = [wl("192.0.2.0/24"), wl("10.0.0.0/8")];
        assert!(matches!(
            effective_client("192.0.2.10", "10.0.0.1", &whitelists),
            Err(Error::ProxyChainInvalid(_))
        ));
    }

    #[test]
    fn test_empty_whitelist_accepts_any_hop() {
        let whitelists = [Whitelist::any(), wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("203.0.113.5, 8.8.4.4", "10.0.0.1", &whitelists),
            Ok(ip("203.0.113.5"))
        );
    }

    #[test]
    fn test_empty_entries_and_whitespace_skipped() {
        let whitelists = [wl("10.0.0.0/8")];
        assert_eq!(
            effective_client(" , 203.0.113.5 ,, ", "10.0.0.1", &whitelists),
            Ok(ip("203.0.113.5"))
        );
    }

    #[test]
    fn test_unparseable_hop_rejected() {
        let whitelists = [wl("192.0.2.0/24"), wl("10.0.0.0/8")];
        assert!(effective_client("203.0.113.5, unknown", "10.0.0.1", &whitelists).is_err());
    }

    #[test]
    fn test_unparseable_client_rejected() {
        let whitelists = [wl("10.0.0.0/8")];
        assert!(effective_client("unknown", "10.0.0.1", &whitelists).is_err());
    }

    #[test]
    fn test_hop_with_port() {
        let whitelists = [wl("10.0.0.0/8")];
        assert_eq!(
            effective_client("203.0.113.5:4711", "10.0.0.1", &whitelists),
            Ok(ip("203.0.113.5"))
        );
        assert_eq!(
            effective_client("[2001:db8::1]:443", "10.0.0.1", &whitelists),
            Ok(ip("2001:db8::1"))
        );
    }

    #[test]
    fn test_ipv6_ranges() {
        let whitelists = [wl("fd00::/8")];
        assert_eq!(
            effective_client("2001:db8::7", "fd12::1", &whitelists),
            Ok(ip("2001:db8::7"))
        );
    }

    #[test]
    fn test_no_whitelists_uses_peer() {
        assert_eq!(
            effective_client("203.0.113.5", "10.0.0.1", &[]),
            Ok(ip("10.0.0.1"))
        );
    }

    #[test]
    fn test_whitelist_parse() {
        let whitelist = wl("10.0.0.0/8, 192.0.2.1");
        assert_eq!(whitelist.ranges().len(), 2);
        assert!(whitelist.matches(&ip("192.0.2.1")));
        assert!(!whitelist.matches(&ip("192.0.2.2")));

        assert!(wl("*").is_empty());
        assert!(wl("").is_empty());
        assert!(Whitelist::parse("10.0.0.0/33").is_err());
        assert!(Whitelist::parse("not-an-ip").is_err());
    }

    #[test]
    fn test_build_chain() {
        assert_eq!(build_chain("a, b,,c ", "d"), vec!["a", "b", "c", "d"]);
        assert_eq!(build_chain("", "d"), vec!["d"]);
    }
}
