use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::types::RdapResponse;
use crate::error::{DossierError, Result};

const IANA_BOOTSTRAP_DNS: &str = "https://data.iana.org/rdap/dns.json";

/// Each RDAP network call is bounded well inside the lookup deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// `services` entries are `[[tld, ...], [base_url, ...]]` pairs (RFC 9224).
#[derive(Deserialize)]
struct BootstrapResponse {
    services: Vec<(Vec<String>, Vec<String>)>,
}

#[derive(Debug, Clone)]
pub struct RdapClient {
    http: Client,
    bootstrap_url: String,
    fixed_server: Option<String>,
    // TLD -> base URL, loaded once per client
    bootstrap: Arc<OnceCell<HashMap<String, String>>>,
}

impl Default for RdapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RdapClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dossier/", env!("CARGO_PKG_VERSION"), " (RDAP Client)"))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            bootstrap_url: IANA_BOOTSTRAP_DNS.to_string(),
            fixed_server: None,
            bootstrap: Arc::new(OnceCell::new()),
        }
    }

    /// Query this RDAP base URL for every domain instead of bootstrapping.
    pub fn with_server(mut self, base_url: impl Into<String>) -> Self {
        self.fixed_server = Some(base_url.into());
        self
    }

    pub fn with_bootstrap_url(mut self, url: impl Into<String>) -> Self {
        self.bootstrap_url = url.into();
        self
    }

    async fn bootstrap(&self) -> Result<&HashMap<String, String>> {
        self.bootstrap
            .get_or_try_init(|| async {
                debug!(url = %self.bootstrap_url, "Loading RDAP bootstrap data");
                let data: BootstrapResponse = self
                    .http
                    .get(&self.bootstrap_url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let table = parse_bootstrap(data);
                debug!(entries = table.len(), "RDAP bootstrap loaded");
                Ok::<_, DossierError>(table)
            })
            .await
    }

    async fn base_url_for(&self, domain: &str) -> Result<String> {
        if let Some(server) = &self.fixed_server {
            return Ok(server.clone());
        }

        let table = self.bootstrap().await?;
        domain_suffixes(domain)
            .find_map(|suffix| table.get(suffix).cloned())
            .ok_or_else(|| DossierError::Rdap(format!("no RDAP server for {}", domain)))
    }

    /// Fetches the RDAP domain object for an already normalized name.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn lookup_domain(&self, domain: &str) -> Result<RdapResponse> {
        let base_url = self.base_url_for(domain).await?;
        let url = format!("{}domain/{}", ensure_trailing_slash(&base_url), domain);
        debug!(url = %url, "Querying RDAP");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/rdap+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DossierError::Rdap(format!(
                "query failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let rdap: RdapResponse = serde_json::from_str(&body)?;
        Ok(rdap)
    }
}

fn parse_bootstrap(data: BootstrapResponse) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for (tlds, urls) in data.services {
        // Prefer an https endpoint when the registry lists several.
        let url = urls
            .iter()
            .find(|u| u.starts_with("https://"))
            .or_else(|| urls.first());
        if let Some(url) = url {
            for tld in tlds {
                table.insert(tld.to_lowercase(), url.clone());
            }
        }
    }
    table
}

/// `a.b.example.co.uk` yields `b.example.co.uk`, ..., `co.uk`, `uk`.
fn domain_suffixes(domain: &str) -> impl Iterator<Item = &str> {
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .map(move |(i, _)| &domain[i + 1..])
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bootstrap_prefers_https() {
        let data: BootstrapResponse = serde_json::from_str(
            r#"{
                "version": "1.0",
                "services": [
                    [["com", "net"], ["http://rdap.verisign.test/", "https://rdap.verisign.test/"]],
                    [["UK"], ["https://rdap.nominet.test/uk/"]]
                ]
            }"#,
        )
        .unwrap();

        let table = parse_bootstrap(data);
        assert_eq!(table.get("com").unwrap(), "https://rdap.verisign.test/");
        assert_eq!(table.get("net").unwrap(), "https://rdap.verisign.test/");
        assert_eq!(table.get("uk").unwrap(), "https://rdap.nominet.test/uk/");
    }

    #[test]
    fn test_domain_suffixes_longest_first() {
        let suffixes: Vec<&str> = domain_suffixes("www.example.co.uk").collect();
        assert_eq!(suffixes, vec!["example.co.uk", "co.uk", "uk"]);
    }

    #[test]
    fn test_ensure_trailing_slash() {
        assert_eq!(ensure_trailing_slash("https://a.test"), "https://a.test/");
        assert_eq!(ensure_trailing_slash("https://a.test/"), "https://a.test/");
    }

    #[tokio::test]
    async fn test_fixed_server_skips_bootstrap() {
        let client = RdapClient::new().with_server("https://rdap.example.test");
        assert_eq!(
            client.base_url_for("example.test").await.unwrap(),
            "https://rdap.example.test"
        );
    }
}
