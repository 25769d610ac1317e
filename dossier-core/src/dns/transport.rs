use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::op::Message;
use hickory_resolver::TokioAsyncResolver;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::error::{DossierError, Result};

/// Default timeout for DNS queries (5 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// Large enough for a signed DNSKEY RRset at the advertised EDNS payload.
const MAX_DATAGRAM: usize = 4096;

/// The wire-level operations the DNS layer needs.
///
/// Lookups return presentation strings. `exchange` sends a raw message to one
/// server and hands back whatever it answered, which is how header flags such
/// as AD are observed.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn lookup_host(&self, name: &str) -> Result<Vec<String>>;

    async fn lookup_mx(&self, name: &str) -> Result<Vec<String>>;

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>>;

    async fn exchange(&self, query: Message, server: SocketAddr) -> Result<Message>;
}

/// [`DnsTransport`] backed by hickory's tokio resolver.
///
/// Uses Google DNS by default, but supports a custom upstream nameserver.
#[derive(Clone)]
pub struct HickoryTransport {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl std::fmt::Debug for HickoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HickoryTransport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Default for HickoryTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, None)
    }
}

impl HickoryTransport {
    pub fn new(timeout: Duration, nameserver: Option<IpAddr>) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;
        opts.use_hosts_file = false;

        let config = match nameserver {
            Some(ip) => {
                let mut config = ResolverConfig::new();
                config.add_name_server(NameServerConfig::new(
                    SocketAddr::new(ip, 53),
                    Protocol::Udp,
                ));
                config
            }
            None => ResolverConfig::google(),
        };

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }
}

#[async_trait]
impl DnsTransport for HickoryTransport {
    async fn lookup_host(&self, name: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .lookup_ip(name)
            .await
            .map_err(|e| DossierError::Dns(format!("host lookup failed: {}", e)))?;

        Ok(response.iter().map(|ip| ip.to_string()).collect())
    }

    async fn lookup_mx(&self, name: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .mx_lookup(name)
            .await
            .map_err(|e| DossierError::Dns(format!("MX lookup failed: {}", e)))?;

        Ok(response
            .iter()
            .map(|mx| mx.exchange().to_string().trim_end_matches('.').to_string())
            .collect())
    }

    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>> {
        let response = self
            .resolver
            .txt_lookup(name)
            .await
            .map_err(|e| DossierError::Dns(format!("TXT lookup failed: {}", e)))?;

        Ok(response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .collect::<String>()
            })
            .collect())
    }

    #[instrument(skip(self, query), fields(server = %server))]
    async fn exchange(&self, query: Message, server: SocketAddr) -> Result<Message> {
        let bytes = query
            .to_vec()
            .map_err(|e| DossierError::Dns(format!("failed to encode query: {}", e)))?;

        let bind = if server.is_ipv4() {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        } else {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
        };
        let socket = UdpSocket::bind(bind)
            .await
            .map_err(|e| DossierError::Dns(format!("failed to bind socket: {}", e)))?;
        socket
            .connect(server)
            .await
            .map_err(|e| DossierError::Dns(format!("failed to reach {}: {}", server, e)))?;
        socket
            .send(&bytes)
            .await
            .map_err(|e| DossierError::Dns(format!("failed to send query: {}", e)))?;

        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let len = timeout(self.timeout, socket.recv(&mut buf))
                .await
                .map_err(|_| DossierError::Dns(format!("{} did not answer in time", server)))?
                .map_err(|e| DossierError::Dns(format!("read error: {}", e)))?;

            let response = Message::from_vec(&buf[..len])
                .map_err(|e| DossierError::Dns(format!("malformed response: {}", e)))?;
            if response.id() == query.id() {
                return Ok(response);
            }
            debug!(id = response.id(), "Discarding response with mismatched id");
        }
    }
}
