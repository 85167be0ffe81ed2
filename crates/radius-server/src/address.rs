//! Client address matching
//!
//! A NAS address pattern is an exact address, a CIDR network
//! (`192.168.1.0/24`, `2001:db8::/32`) or a hostname that is resolved at
//! match time. IPv4/IPv6-only patterns accept `*` for any address of the
//! family.

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Pattern that matches every address of a family
pub const WILDCARD: &str = "*";

/// Hostname resolution used by [`match_ip_address`]
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system (`getaddrinfo`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Fixed host table; unknown names fail to resolve
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.hosts.insert(host.into().to_ascii_lowercase(), addrs);
        self
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.hosts
            .get(&host.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {}", host)))
    }
}

/// Match `source` against an exact address, a CIDR network or a hostname
///
/// Resolution failures are a non-match.
pub async fn match_ip_address(pattern: &str, source: IpAddr, resolver: &dyn DnsResolver) -> bool {
    if pattern == source.to_string() {
        return true;
    }

    if pattern.contains('/') {
        return match_cidr(pattern, source);
    }

    if let Ok(addr) = pattern.parse::<IpAddr>() {
        return addr == source;
    }

    match resolver.resolve(pattern).await {
        Ok(addrs) => addrs.contains(&source),
        Err(e) => {
            debug!(host = %pattern, error = %e, "Hostname resolution failed");
            false
        }
    }
}

/// Match an IPv4 source against `*` or an exact IPv4 address
pub fn match_ipv4_address(pattern: &str, source: IpAddr) -> bool {
    match source {
        IpAddr::V4(v4) => pattern == WILDCARD || pattern.parse::<Ipv4Addr>().is_ok_and(|p| p == v4),
        IpAddr::V6(_) => false,
    }
}

/// Match an IPv6 source against `*` or an exact IPv6 address
pub fn match_ipv6_address(pattern: &str, source: IpAddr) -> bool {
    match source {
        IpAddr::V6(v6) => pattern == WILDCARD || pattern.parse::<Ipv6Addr>().is_ok_and(|p| p == v6),
        IpAddr::V4(_) => false,
    }
}

/// Prefix match; host bits set in the pattern's network address are ignored
/// and a family mismatch never matches
pub fn match_cidr(pattern: &str, source: IpAddr) -> bool {
    match pattern.parse::<IpNetwork>() {
        Ok(network) => network.contains(source),
        Err(_) => false,
    }
}
