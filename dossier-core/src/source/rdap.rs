use async_trait::async_trait;
use tracing::{debug, instrument};

use super::LookupSource;
use crate::error::Result;
use crate::rdap::{RdapClient, RdapResponse};
use crate::record::DomainRecord;

/// Registration data from the registry's RDAP service.
#[derive(Debug, Clone, Default)]
pub struct RdapSource {
    client: RdapClient,
}

impl RdapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: RdapClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LookupSource for RdapSource {
    fn name(&self) -> &str {
        "RDAP"
    }

    #[instrument(skip(self), fields(domain = %domain))]
    async fn resolve(&self, domain: &str) -> Result<DomainRecord> {
        let response = self.client.lookup_domain(domain).await?;
        debug!(handle = ?response.handle, "RDAP lookup succeeded");
        Ok(record_from_rdap(domain, &response))
    }
}

/// Maps an RDAP domain object onto a record. Event dates that are not strict
/// RFC 3339 are left unknown.
pub fn record_from_rdap(domain: &str, response: &RdapResponse) -> DomainRecord {
    DomainRecord {
        registrar: response.registrar_handle().unwrap_or_default(),
        nameservers: response.nameserver_names(),
        dnssec_enabled: response.is_delegation_signed(),
        status: response.status.clone(),
        created_at: response.event_date("registration"),
        updated_at: response.event_date("last changed"),
        expires_at: response.event_date("expiration"),
        ..DomainRecord::new(domain)
    }
}
