use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::servers::{get_tld, get_whois_server, IANA_WHOIS_SERVER};
use crate::error::{DossierError, Result};

const WHOIS_PORT: u16 = 43;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB
const MAX_REFERRAL_DEPTH: u8 = 3;

static REFERRAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)^\s*Registrar WHOIS Server:[ \t]*(\S+)",
        r"(?im)^\s*Whois Server:[ \t]*(\S+)",
        r"(?im)^\s*ReferralServer:[ \t]*whois://(\S+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static IANA_REFER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:refer|whois):[ \t]*(\S+)").expect("valid regex"));

/// Anything that can fetch the raw WHOIS text for a domain.
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    async fn fetch(&self, domain: &str) -> Result<String>;
}

/// Raw port-43 WHOIS transport.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the raw WHOIS text for an already normalized domain, following
    /// registrar referrals from thin registries.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn query(&self, domain: &str) -> Result<String> {
        let tld = get_tld(domain).ok_or_else(|| DossierError::InvalidDomain(domain.to_string()))?;

        let server = match get_whois_server(tld) {
            Some(server) => server.to_string(),
            None => self.discover_server(tld).await?,
        };

        let mut visited = HashSet::new();
        let registry_response = self.query_server(&server, domain).await?;
        visited.insert(server.to_lowercase());

        let mut response = registry_response;
        let mut current = server;
        for depth in 1..=MAX_REFERRAL_DEPTH {
            let Some(referral) = extract_referral(&response) else {
                break;
            };
            if referral == current || !visited.insert(referral.clone()) {
                debug!(referral = %referral, "Ignoring circular WHOIS referral");
                break;
            }

            debug!(referral = %referral, depth, "Following WHOIS referral");
            match self.query_server(&referral, domain).await {
                Ok(referred) if !referred.trim().is_empty() => {
                    response = referred;
                    current = referral;
                }
                Ok(_) => break,
                Err(e) => {
                    // The registry answer is still usable.
                    warn!(referral = %referral, error = %e, "WHOIS referral failed");
                    break;
                }
            }
        }

        Ok(response)
    }

    /// Asks IANA which server is authoritative for `tld`.
    async fn discover_server(&self, tld: &str) -> Result<String> {
        debug!(tld = %tld, "Discovering WHOIS server via IANA");
        let response = self.query_server(IANA_WHOIS_SERVER, tld).await?;
        IANA_REFER
            .captures(&response)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_lowercase())
            .filter(|server| server.contains('.'))
            .ok_or_else(|| DossierError::Whois(format!("no WHOIS server known for .{}", tld)))
    }

    async fn query_server(&self, server: &str, query: &str) -> Result<String> {
        let addr = format!("{}:{}", server, WHOIS_PORT);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DossierError::Whois(format!("connection to {} timed out", server)))?
            .map_err(|e| DossierError::Whois(format!("failed to connect to {}: {}", server, e)))?;

        let query_bytes = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_bytes.as_bytes()))
            .await
            .map_err(|_| DossierError::Whois("write timed out".to_string()))?
            .map_err(|e| DossierError::Whois(format!("failed to send query: {}", e)))?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(DossierError::Whois("response too large".to_string()));
                    }
                }
                Ok(Err(e)) => return Err(DossierError::Whois(format!("read error: {}", e))),
                Err(_) if !response.is_empty() => break,
                Err(_) => return Err(DossierError::Whois("read timed out".to_string())),
            }
        }

        Ok(decode(response))
    }
}

#[async_trait]
impl WhoisTransport for WhoisClient {
    async fn fetch(&self, domain: &str) -> Result<String> {
        self.query(domain).await
    }
}

/// UTF-8 with a Latin-1 fallback; some ccTLD registries still answer in ISO-8859-1.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn extract_referral(response: &str) -> Option<String> {
    REFERRAL_PATTERNS.iter().find_map(|re| {
        let server = re.captures(response)?.get(1)?.as_str().trim().to_lowercase();
        let server = server
            .trim_start_matches("whois://")
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string();
        (!server.is_empty() && server.contains('.')).then_some(server)
    })
}
