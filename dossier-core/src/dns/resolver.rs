use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use hickory_resolver::proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_resolver::proto::rr::{Name, RecordType};
use tracing::{debug, instrument};

use super::records::DnsRecords;
use super::transport::{DnsTransport, HickoryTransport};
use crate::error::{DossierError, Result};

/// Validating public resolver asked whether a zone is signed.
pub const DEFAULT_DNSSEC_SERVER: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53);

const EDNS_PAYLOAD: u16 = 1232;

/// Enriches resolved records with live DNS data.
///
/// Every lookup here is best effort: failures leave the affected field empty
/// (or `false`) and are only logged.
#[derive(Clone)]
pub struct DnsResolver {
    transport: Arc<dyn DnsTransport>,
    dnssec_server: SocketAddr,
}

impl std::fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsResolver")
            .field("dnssec_server", &self.dnssec_server)
            .finish_non_exhaustive()
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver {
    /// Creates a resolver over [`HickoryTransport`] with Google upstreams.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HickoryTransport::default()))
    }

    pub fn with_transport(transport: Arc<dyn DnsTransport>) -> Self {
        Self {
            transport,
            dnssec_server: DEFAULT_DNSSEC_SERVER,
        }
    }

    pub fn with_dnssec_server(mut self, server: SocketAddr) -> Self {
        self.dnssec_server = server;
        self
    }

    /// Looks up A, MX and TXT concurrently. Each set fails on its own.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn records(&self, domain: &str) -> DnsRecords {
        let (a, mx, txt) = tokio::join!(
            self.transport.lookup_host(domain),
            self.transport.lookup_mx(domain),
            self.transport.lookup_txt(domain),
        );

        DnsRecords {
            a: best_effort("A", a),
            mx: best_effort("MX", mx),
            txt: best_effort("TXT", txt),
        }
    }

    /// True only when the configured validating resolver sets the AD flag on
    /// its answer to a DNSKEY query for `domain`.
    #[instrument(skip(self), fields(domain = %domain, server = %self.dnssec_server))]
    pub async fn dnssec_enabled(&self, domain: &str) -> bool {
        let query = match dnskey_query(domain) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "Could not build DNSKEY query");
                return false;
            }
        };

        match self.transport.exchange(query, self.dnssec_server).await {
            Ok(response) => response.authentic_data(),
            Err(e) => {
                debug!(error = %e, "DNSSEC check failed");
                false
            }
        }
    }
}

fn best_effort(kind: &str, result: Result<Vec<String>>) -> Vec<String> {
    match result {
        Ok(values) => values,
        Err(e) => {
            debug!(record_type = kind, error = %e, "DNS lookup failed");
            Vec::new()
        }
    }
}

/// DNSKEY query with recursion desired and the AD bit set, so the resolver
/// reports whether it validated the answer.
pub(crate) fn dnskey_query(domain: &str) -> Result<Message> {
    let name = Name::from_ascii(format!("{}.", domain.trim_end_matches('.')))
        .map_err(|e| DossierError::Dns(format!("invalid name {}: {}", domain, e)))?;

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_PAYLOAD);

    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_authentic_data(true)
        .add_query(Query::query(name, RecordType::DNSKEY));
    message.set_edns(edns);

    Ok(message)
}
