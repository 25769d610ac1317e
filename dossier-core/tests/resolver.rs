use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dossier_core::dns::DnsRecords;
use dossier_core::{
    DnsResolver, DnsTransport, DomainRecord, DomainResolver, DossierError, LookupSource,
    ManualClock, Result,
};
use hickory_resolver::proto::op::{Message, MessageType};
use tokio::time::Instant;

/// A source that answers after a fixed delay and counts how often it ran.
struct MockSource {
    name: &'static str,
    delay: Duration,
    outcome: std::result::Result<DomainRecord, String>,
    calls: AtomicUsize,
}

impl MockSource {
    fn ok(name: &'static str, delay: Duration, record: DomainRecord) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay,
            outcome: Ok(record),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay,
            outcome: Err(format!("{} is down", name)),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupSource for MockSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn resolve(&self, _domain: &str) -> Result<DomainRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.outcome.clone().map_err(DossierError::Rdap)
    }
}

/// DNS that always answers with the same data.
struct MockDns {
    a: Vec<String>,
    ad: bool,
}

impl MockDns {
    fn resolver(a: &[&str], ad: bool) -> DnsResolver {
        DnsResolver::with_transport(Arc::new(Self {
            a: a.iter().map(|s| s.to_string()).collect(),
            ad,
        }))
    }
}

#[async_trait]
impl DnsTransport for MockDns {
    async fn lookup_host(&self, _name: &str) -> Result<Vec<String>> {
        Ok(self.a.clone())
    }

    async fn lookup_mx(&self, _name: &str) -> Result<Vec<String>> {
        Err(DossierError::Dns("no MX".to_string()))
    }

    async fn lookup_txt(&self, _name: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn exchange(&self, query: Message, _server: SocketAddr) -> Result<Message> {
        let mut response = Message::new();
        response
            .set_id(query.id())
            .set_message_type(MessageType::Response)
            .set_authentic_data(self.ad);
        Ok(response)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn registration(registrar: &str) -> DomainRecord {
    DomainRecord {
        registrar: registrar.to_string(),
        created_at: Some(Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap()),
        ..DomainRecord::new("example.test")
    }
}

fn resolver_with(
    sources: Vec<Arc<dyn LookupSource>>,
    dns: DnsResolver,
    clock: Arc<ManualClock>,
) -> DomainResolver {
    sources
        .into_iter()
        .fold(DomainResolver::builder(), |builder, source| builder.source(source))
        .dns(dns)
        .clock(clock)
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_resolves_and_enriches_winner() {
    let clock = Arc::new(ManualClock::new(now()));
    let rdap = MockSource::ok("RDAP", Duration::from_millis(20), registration("Example Registrar"));
    let resolver = resolver_with(
        vec![rdap.clone()],
        MockDns::resolver(&["93.184.216.34"], false),
        clock,
    );

    let record = resolver.resolve("example.test").await.unwrap();

    assert_eq!(record.domain, "example.test");
    assert_eq!(record.registrar, "Example Registrar");
    assert_eq!(
        record.created_at,
        Some(Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap())
    );
    assert_eq!(record.dns_records.a, vec!["93.184.216.34".to_string()]);
    assert!(record.dns_records.mx.is_empty());
    assert_eq!(record.source, "RDAP");
    assert_eq!(record.resolved_at, now());
    assert!(!record.dnssec_enabled);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_cache_hit_skips_sources() {
    let clock = Arc::new(ManualClock::new(now()));
    let rdap = MockSource::ok("RDAP", Duration::from_millis(20), registration("Example Registrar"));
    let resolver = resolver_with(
        vec![rdap.clone()],
        MockDns::resolver(&["93.184.216.34"], true),
        clock.clone(),
    );

    let first = resolver.resolve("example.test").await.unwrap();
    clock.advance(chrono::Duration::minutes(59));
    let second = resolver.resolve("EXAMPLE.test").await.unwrap();

    assert_eq!(rdap.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(second.resolved_at, now());
}

#[tokio::test(start_paused = true)]
async fn test_expired_cache_entry_is_resolved_again() {
    let clock = Arc::new(ManualClock::new(now()));
    let rdap = MockSource::ok("RDAP", Duration::from_millis(20), registration("Example Registrar"));
    let resolver = resolver_with(
        vec![rdap.clone()],
        MockDns::resolver(&[], false),
        clock.clone(),
    );

    resolver.resolve("example.test").await.unwrap();
    clock.advance(chrono::Duration::minutes(61));
    let refreshed = resolver.resolve("example.test").await.unwrap();

    assert_eq!(rdap.calls(), 2);
    assert_eq!(refreshed.resolved_at, now() + chrono::Duration::minutes(61));
}

#[tokio::test(start_paused = true)]
async fn test_fastest_success_wins() {
    let clock = Arc::new(ManualClock::new(now()));
    let fast = MockSource::ok("A", Duration::from_millis(10), registration("Fast Registrar"));
    let slow = MockSource::ok("B", Duration::from_millis(200), registration("Slow Registrar"));
    let resolver = resolver_with(
        vec![slow.clone(), fast.clone()],
        MockDns::resolver(&[], false),
        clock,
    );

    let started = Instant::now();
    let record = resolver.resolve("example.test").await.unwrap();

    assert_eq!(record.source, "A");
    assert_eq!(record.registrar, "Fast Registrar");
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_failure_does_not_end_the_race() {
    let clock = Arc::new(ManualClock::new(now()));
    let broken = MockSource::failing("RDAP", Duration::ZERO);
    let working = MockSource::ok("WHOIS", Duration::from_millis(300), registration("Whois Registrar"));
    let resolver = resolver_with(
        vec![broken, working],
        MockDns::resolver(&[], false),
        clock,
    );

    let record = resolver.resolve("example.test").await.unwrap();
    assert_eq!(record.source, "WHOIS");
}

#[tokio::test(start_paused = true)]
async fn test_all_failures_wait_for_deadline() {
    let clock = Arc::new(ManualClock::new(now()));
    let resolver = resolver_with(
        vec![
            MockSource::failing("RDAP", Duration::ZERO),
            MockSource::failing("WHOIS", Duration::ZERO),
        ],
        MockDns::resolver(&[], false),
        clock,
    );

    let started = Instant::now();
    let err = resolver.resolve("example.test").await.unwrap_err();

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(err.source_tag(), "System");
    assert_eq!(err.to_string(), "System error: All lookups timed out");
    assert!(resolver.cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_success_after_deadline_is_ignored() {
    let clock = Arc::new(ManualClock::new(now()));
    let late = MockSource::ok("RDAP", Duration::from_secs(6), registration("Late Registrar"));
    let resolver = DomainResolver::builder()
        .source(late)
        .dns(MockDns::resolver(&[], false))
        .clock(clock)
        .deadline(Duration::from_secs(5))
        .build();

    let err = resolver.resolve("example.test").await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_dns_fields_come_from_dns() {
    let clock = Arc::new(ManualClock::new(now()));
    let claimed = DomainRecord {
        dnssec_enabled: true,
        dns_records: DnsRecords {
            a: vec!["10.0.0.1".to_string()],
            mx: vec!["stale.example.test".to_string()],
            txt: Vec::new(),
        },
        ..registration("Example Registrar")
    };
    let resolver = resolver_with(
        vec![MockSource::ok("RDAP", Duration::ZERO, claimed)],
        MockDns::resolver(&["192.0.2.7"], false),
        clock,
    );

    let record = resolver.resolve("example.test").await.unwrap();
    assert!(!record.dnssec_enabled);
    assert_eq!(record.dns_records.a, vec!["192.0.2.7".to_string()]);
    assert!(record.dns_records.mx.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_domain_never_reaches_sources() {
    let clock = Arc::new(ManualClock::new(now()));
    let rdap = MockSource::ok("RDAP", Duration::ZERO, registration("Example Registrar"));
    let resolver = resolver_with(vec![rdap.clone()], MockDns::resolver(&[], false), clock);

    let err = resolver.resolve("not a domain").await.unwrap_err();
    assert_eq!(err.source_tag(), "Input");
    assert_eq!(rdap.calls(), 0);
}
