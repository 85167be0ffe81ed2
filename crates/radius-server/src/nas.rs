//! NAS (RADIUS client) records and lookup by source address

use crate::address::{match_ip_address, match_ipv4_address, match_ipv6_address, DnsResolver, SystemResolver};
use async_trait::async_trait;
use radius_proto::SharedSecret;
use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// How a NAS address pattern is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NasAddressKind {
    /// Exact address, CIDR network or hostname
    #[serde(rename = "ipaddr")]
    IpAddr,
    /// Exact IPv4 address or `*`
    #[serde(rename = "ipv4addr")]
    Ipv4Addr,
    /// Exact IPv6 address or `*`
    #[serde(rename = "ipv6addr")]
    Ipv6Addr,
}

impl fmt::Display for NasAddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NasAddressKind::IpAddr => "ipaddr",
            NasAddressKind::Ipv4Addr => "ipv4addr",
            NasAddressKind::Ipv6Addr => "ipv6addr",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NasAddress {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: NasAddressKind,
}

impl NasAddress {
    pub fn new(value: impl Into<String>, kind: NasAddressKind) -> Self {
        NasAddress {
            value: value.into(),
            kind,
        }
    }
}

/// Connection limits carried with a NAS record (informational)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NasLimits {
    pub max_connections: u32,
    /// Seconds, 0 = unlimited
    pub lifetime: u64,
    /// Seconds, 0 = unlimited
    pub idle_timeout: u64,
}

/// A configured RADIUS client
///
/// Never serialized; `Debug` output redacts the secret.
#[derive(Debug, Clone, Deserialize)]
pub struct Nas {
    pub short_name: String,
    pub address: NasAddress,
    pub secret: SharedSecret,
    #[serde(default)]
    pub limit: Option<NasLimits>,
}

impl Nas {
    pub fn new(short_name: impl Into<String>, address: NasAddress, secret: impl Into<SharedSecret>) -> Self {
        Nas {
            short_name: short_name.into(),
            address,
            secret: secret.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: NasLimits) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `source` is covered by this NAS's address pattern
    pub async fn matches(&self, source: IpAddr, resolver: &dyn DnsResolver) -> bool {
        match self.address.kind {
            NasAddressKind::IpAddr => match_ip_address(&self.address.value, source, resolver).await,
            NasAddressKind::Ipv4Addr => match_ipv4_address(&self.address.value, source),
            NasAddressKind::Ipv6Addr => match_ipv6_address(&self.address.value, source),
        }
    }
}

/// NAS lookup by packet source address
#[async_trait]
pub trait NasProvider: Send + Sync {
    /// `None` means the source is not a known client
    async fn get_nas(&self, source: IpAddr) -> Option<Arc<Nas>>;
}

/// In-memory NAS list; the first matching record wins
pub struct DefaultNasProvider {
    nas: Vec<Arc<Nas>>,
    resolver: Arc<dyn DnsResolver>,
}

impl DefaultNasProvider {
    pub fn new(nas: Vec<Nas>) -> Self {
        Self::with_resolver(nas, Arc::new(SystemResolver))
    }

    pub fn with_resolver(nas: Vec<Nas>, resolver: Arc<dyn DnsResolver>) -> Self {
        DefaultNasProvider {
            nas: nas.into_iter().map(Arc::new).collect(),
            resolver,
        }
    }

    pub fn len(&self) -> usize {
        self.nas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nas.is_empty()
    }
}

#[async_trait]
impl NasProvider for DefaultNasProvider {
    async fn get_nas(&self, source: IpAddr) -> Option<Arc<Nas>> {
        for nas in &self.nas {
            if nas.matches(source, self.resolver.as_ref()).await {
                return Some(Arc::clone(nas));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::StaticResolver;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn provider() -> DefaultNasProvider {
        let resolver = StaticResolver::new().with_host("wifi.example.net", vec![ip("172.16.0.10")]);
        DefaultNasProvider::with_resolver(
            vec![
                Nas::new("core", NasAddress::new("10.0.0.1", NasAddressKind::IpAddr), "core-secret"),
                Nas::new("lab", NasAddress::new("192.168.1.0/24", NasAddressKind::IpAddr), "lab-secret"),
                Nas::new("wifi", NasAddress::new("wifi.example.net", NasAddressKind::IpAddr), "wifi-secret"),
                Nas::new("v6", NasAddress::new("*", NasAddressKind::Ipv6Addr), "v6-secret"),
                Nas::new("catch-all", NasAddress::new("0.0.0.0/0", NasAddressKind::IpAddr), "other"),
            ],
            Arc::new(resolver),
        )
    }

    #[tokio::test]
    async fn test_lookup_by_kind() {
        let provider = provider();
        assert_eq!(provider.get_nas(ip("10.0.0.1")).await.unwrap().short_name, "core");
        assert_eq!(provider.get_nas(ip("192.168.1.9")).await.unwrap().short_name, "lab");
        assert_eq!(provider.get_nas(ip("172.16.0.10")).await.unwrap().short_name, "wifi");
        assert_eq!(provider.get_nas(ip("2001:db8::7")).await.unwrap().short_name, "v6");
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let provider = provider();
        // Also covered by the catch-all entry
        let nas = provider.get_nas(ip("192.168.1.9")).await.unwrap();
        assert_eq!(nas.secret, SharedSecret::from("lab-secret"));
        assert_eq!(provider.get_nas(ip("8.8.8.8")).await.unwrap().short_name, "catch-all");
    }

    #[tokio::test]
    async fn test_not_found() {
        let provider = DefaultNasProvider::with_resolver(
            vec![Nas::new("lab", NasAddress::new("192.168.1.0/24", NasAddressKind::IpAddr), "s")],
            Arc::new(StaticResolver::new()),
        );
        assert!(provider.get_nas(ip("192.168.2.1")).await.is_none());
    }

    #[test]
    fn test_deserialize() {
        let nas: Nas = serde_json::from_str(
            r#"{
                "short_name": "edge",
                "address": { "value": "*", "type": "ipv4addr" },
                "secret": "s3cret",
                "limit": { "max_connections": 16, "idle_timeout": 30 }
            }"#,
        )
        .unwrap();

        assert_eq!(nas.address.kind, NasAddressKind::Ipv4Addr);
        assert_eq!(nas.secret.as_bytes(), b"s3cret");
        let limit = nas.limit.unwrap();
        assert_eq!(limit.max_connections, 16);
        assert_eq!(limit.lifetime, 0);
        assert_eq!(limit.idle_timeout, 30);
    }

    #[test]
    fn test_debug_hides_secret() {
        let nas = Nas::new("core", NasAddress::new("10.0.0.1", NasAddressKind::IpAddr), "do-not-print");
        assert!(!format!("{:?}", nas).contains("do-not-print"));
    }
}
