use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::LookupSource;
use crate::date::normalize_date;
use crate::error::{DossierError, Result};
use crate::record::DomainRecord;
use crate::whois::{parse_whois, WhoisClient, WhoisRecord, WhoisTransport};

/// Registration data from raw port-43 WHOIS.
#[derive(Clone)]
pub struct WhoisSource {
    transport: Arc<dyn WhoisTransport>,
}

impl fmt::Debug for WhoisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhoisSource").finish_non_exhaustive()
    }
}

impl Default for WhoisSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisSource {
    pub fn new() -> Self {
        Self::with_client(WhoisClient::new())
    }

    pub fn with_client(client: WhoisClient) -> Self {
        Self::with_transport(Arc::new(client))
    }

    pub fn with_transport(transport: Arc<dyn WhoisTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl LookupSource for WhoisSource {
    fn name(&self) -> &str {
        "WHOIS"
    }

    #[instrument(skip(self), fields(domain = %domain))]
    async fn resolve(&self, domain: &str) -> Result<DomainRecord> {
        let raw = self.transport.fetch(domain).await.map_err(|e| match e {
            DossierError::Whois(_) => e,
            other => DossierError::Whois(other.to_string()),
        })?;
        debug!(bytes = raw.len(), "WHOIS response received");

        let parsed = parse_whois(&raw)?;
        Ok(record_from_whois(domain, &parsed))
    }
}

/// Maps parsed WHOIS fields onto a record, normalizing every date.
pub fn record_from_whois(domain: &str, whois: &WhoisRecord) -> DomainRecord {
    let date = |raw: &Option<String>| raw.as_deref().and_then(normalize_date);

    DomainRecord {
        registrar: whois.registrar.clone().unwrap_or_default(),
        nameservers: whois.nameservers.clone(),
        dnssec_enabled: whois.dnssec.as_deref().is_some_and(is_signed),
        status: whois.status.clone(),
        created_at: date(&whois.created_date),
        updated_at: date(&whois.updated_date),
        expires_at: date(&whois.expiration_date),
        ..DomainRecord::new(domain)
    }
}

fn is_signed(value: &str) -> bool {
    let value = value.to_lowercase();
    !value.starts_with("unsigned")
        && !value.starts_with("no")
        && (value.contains("signed") || value == "yes" || value == "active")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    enum CannedWhois {
        Answer(&'static str),
        Refused,
        NoServer,
    }

    #[async_trait]
    impl WhoisTransport for CannedWhois {
        async fn fetch(&self, domain: &str) -> Result<String> {
            match self {
                CannedWhois::Answer(raw) => Ok(raw.to_string()),
                CannedWhois::Refused => Err(DossierError::Whois(
                    "failed to connect to whois.example: connection refused".to_string(),
                )),
                CannedWhois::NoServer => Err(DossierError::InvalidDomain(domain.to_string())),
            }
        }
    }

    fn source(canned: CannedWhois) -> WhoisSource {
        WhoisSource::with_transport(Arc::new(canned))
    }

    #[tokio::test]
    async fn test_transport_failure_is_tagged_whois() {
        let err = source(CannedWhois::Refused)
            .resolve("example.test")
            .await
            .unwrap_err();
        assert_eq!(err.source_tag(), "WHOIS");
        assert!(err.to_string().contains("connection refused"));

        // Lower layers can fail with other tags; they are reported as WHOIS.
        let err = source(CannedWhois::NoServer)
            .resolve("example.test")
            .await
            .unwrap_err();
        assert_eq!(err.source_tag(), "WHOIS");
    }

    #[tokio::test]
    async fn test_unparsable_response_is_tagged_parser() {
        let err = source(CannedWhois::Answer("No match for \"EXAMPLE.TEST\".\r\n"))
            .resolve("example.test")
            .await
            .unwrap_err();
        assert_eq!(err.source_tag(), "WHOIS Parser");
    }

    #[tokio::test]
    async fn test_resolve_maps_response() {
        let record = source(CannedWhois::Answer(
            "Registrar: Example Registrar\nCreation Date: 2020-01-15T00:00:00Z\n",
        ))
        .resolve("example.test")
        .await
        .unwrap();
        assert_eq!(record.registrar, "Example Registrar");
        assert_eq!(
            record.created_at,
            Some(Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_dates_are_normalized() {
        let whois = WhoisRecord {
            registrar: Some("Example Registrar Ltd".to_string()),
            nameservers: vec!["ns1.example.net".to_string()],
            status: vec!["Registered".to_string()],
            created_date: Some("26-Aug-1996".to_string()),
            updated_date: Some("2024. 07. 12.".to_string()),
            expiration_date: Some("2026-08-26T00:00:00Z".to_string()),
            dnssec: Some("unsigned".to_string()),
        };

        let record = record_from_whois("example.co.uk", &whois);
        assert_eq!(record.domain, "example.co.uk");
        assert_eq!(record.registrar, "Example Registrar Ltd");
        assert_eq!(
            record.created_at,
            Some(Utc.with_ymd_and_hms(1996, 8, 26, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 7, 12, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.expires_at,
            Some(Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 0).unwrap())
        );
        assert!(!record.dnssec_enabled);
    }

    #[test]
    fn test_unparsable_date_stays_unknown() {
        let whois = WhoisRecord {
            registrar: Some("R".to_string()),
            created_date: Some("sometime last spring".to_string()),
            ..Default::default()
        };

        let record = record_from_whois("example.test", &whois);
        assert!(record.created_at.is_none());
        assert!(record.nameservers.is_empty());
    }

    #[test]
    fn test_dnssec_values() {
        assert!(is_signed("signedDelegation"));
        assert!(is_signed("yes"));
        assert!(!is_signed("unsigned"));
        assert!(!is_signed("no"));
        assert!(!is_signed("Unsigned delegation"));
    }
}
