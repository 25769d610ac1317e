use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, instrument, warn};

use crate::cache::{Clock, RecordCache, SystemClock};
use crate::config::LookupConfig;
use crate::dns::{DnsResolver, HickoryTransport};
use crate::error::{DossierError, Result};
use crate::rdap::RdapClient;
use crate::record::DomainRecord;
use crate::source::{LookupSource, RdapSource, WhoisSource};
use crate::validation::normalize_domain;
use crate::whois::WhoisClient;

const TIMED_OUT: &str = "All lookups timed out";

/// Races every configured [`LookupSource`] for a domain, keeps the first
/// success, enriches it with live DNS and caches it.
///
/// # Example
///
/// ```no_run
/// use dossier_core::DomainResolver;
///
/// # async fn run() -> dossier_core::Result<()> {
/// let resolver = DomainResolver::new();
/// let record = resolver.resolve("example.com").await?;
/// println!("{} via {}", record.registrar, record.source);
/// # Ok(())
/// # }
/// ```
pub struct DomainResolver {
    sources: Vec<Arc<dyn LookupSource>>,
    dns: DnsResolver,
    cache: Arc<RecordCache>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
}

impl fmt::Debug for DomainResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("DomainResolver")
            .field("sources", &sources)
            .field("dns", &self.dns)
            .field("cache", &self.cache)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Default for DomainResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainResolver {
    /// RDAP and WHOIS against live servers with default timeouts.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: LookupConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> DomainResolverBuilder {
        DomainResolverBuilder::default()
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Resolves `domain` to a merged record.
    ///
    /// A fresh cached record is returned without touching the network.
    /// Otherwise the sources race until the first success or the deadline;
    /// if none succeeds, the call fails with a `System` error once the full
    /// deadline has elapsed, even when every source failed early.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn resolve(&self, domain: &str) -> Result<DomainRecord> {
        let domain = normalize_domain(domain)?;

        if let Some(record) = self.cache.get(&domain) {
            debug!(source = %record.source, "Cache hit");
            return Ok(record);
        }

        let (source, mut record) = self.race(&domain).await?;
        debug!(source = %source, "Lookup won the race");

        record.domain = domain.clone();
        record.source = source;
        record.resolved_at = self.clock.now();

        let (dns_records, dnssec_enabled) = tokio::join!(
            self.dns.records(&domain),
            self.dns.dnssec_enabled(&domain),
        );
        record.dns_records = dns_records;
        record.dnssec_enabled = dnssec_enabled;

        self.cache.put(&domain, record.clone());
        Ok(record)
    }

    async fn race(&self, domain: &str) -> Result<(String, DomainRecord)> {
        let deadline = Instant::now() + self.deadline;
        let (tx, mut rx) = mpsc::channel(self.sources.len().max(1));

        for source in &self.sources {
            let source = Arc::clone(source);
            let tx = tx.clone();
            let domain = domain.to_string();
            tokio::spawn(async move {
                let outcome = source.resolve(&domain).await;
                // The receiver is gone once a winner is chosen or time ran out.
                let _ = tx.send((source.name().to_string(), outcome)).await;
            });
        }
        drop(tx);

        loop {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some((name, Ok(record)))) => return Ok((name, record)),
                Ok(Some((name, Err(e)))) => {
                    warn!(source = %name, tag = e.source_tag(), error = %e, "Lookup failed");
                }
                Ok(None) => {
                    sleep_until(deadline).await;
                    break;
                }
                Err(_) => break,
            }
        }

        warn!(deadline_ms = self.deadline.as_millis() as u64, "{}", TIMED_OUT);
        Err(DossierError::System(TIMED_OUT.to_string()))
    }
}

/// Assembles a [`DomainResolver`]. Anything left unset is built from the
/// [`LookupConfig`].
#[derive(Default)]
pub struct DomainResolverBuilder {
    config: LookupConfig,
    sources: Vec<Arc<dyn LookupSource>>,
    dns: Option<DnsResolver>,
    cache: Option<Arc<RecordCache>>,
    clock: Option<Arc<dyn Clock>>,
}

impl DomainResolverBuilder {
    pub fn config(mut self, config: LookupConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a source to the race. Without any, RDAP and WHOIS are used.
    pub fn source(mut self, source: Arc<dyn LookupSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn dns(mut self, dns: DnsResolver) -> Self {
        self.dns = Some(dns);
        self
    }

    /// Shares an existing cache, for example between several resolvers.
    pub fn cache(mut self, cache: Arc<RecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = deadline;
        self
    }

    pub fn build(self) -> DomainResolver {
        let config = self.config;

        let sources = if self.sources.is_empty() {
            let rdap = RdapSource::with_client(RdapClient::with_timeout(config.rdap_timeout));
            let whois =
                WhoisSource::with_client(WhoisClient::new().with_timeout(config.whois_timeout));
            vec![
                Arc::new(rdap) as Arc<dyn LookupSource>,
                Arc::new(whois) as Arc<dyn LookupSource>,
            ]
        } else {
            self.sources
        };

        let dns = self.dns.unwrap_or_else(|| {
            DnsResolver::with_transport(Arc::new(HickoryTransport::new(
                config.dns_timeout,
                config.nameserver,
            )))
            .with_dnssec_server(config.dnssec_server)
        });

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(RecordCache::new(config.cache_ttl, clock.clone())));

        DomainResolver {
            sources,
            dns,
            cache,
            clock,
            deadline: config.deadline,
        }
    }
}
