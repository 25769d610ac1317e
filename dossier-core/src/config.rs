use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::DEFAULT_TTL;
use crate::dns::DEFAULT_DNSSEC_SERVER;

/// Overall time allowed for the source race.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Tunables for a [`DomainResolver`](crate::DomainResolver).
///
/// Durations accept human-readable strings (`"5s"`, `"1h"`) when loaded
/// through serde. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    #[serde(with = "humantime_serde")]
    pub deadline: Duration,
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub rdap_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub whois_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub dns_timeout: Duration,
    pub dnssec_server: SocketAddr,
    /// Upstream for A/MX/TXT lookups; Google DNS when unset.
    pub nameserver: Option<IpAddr>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            cache_ttl: DEFAULT_TTL,
            rdap_timeout: crate::rdap::DEFAULT_TIMEOUT,
            whois_timeout: crate::whois::DEFAULT_TIMEOUT,
            dns_timeout: crate::dns::DEFAULT_TIMEOUT,
            dnssec_server: DEFAULT_DNSSEC_SERVER,
            nameserver: None,
        }
    }
}

impl LookupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_rdap_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self
    }

    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn with_dnssec_server(mut self, server: SocketAddr) -> Self {
        self.dnssec_server = server;
        self
    }

    pub fn with_nameserver(mut self, nameserver: IpAddr) -> Self {
        self.nameserver = Some(nameserver);
        self
    }
}
