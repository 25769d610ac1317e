//! Competing lookup strategies for registration data.

mod rdap;
mod whois;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::DomainRecord;

pub use self::rdap::{record_from_rdap, RdapSource};
pub use self::whois::{record_from_whois, WhoisSource};

/// One way of turning a domain name into registration data.
///
/// A source fills in whatever registration fields it knows. DNS fields,
/// `resolved_at` and `source` are stamped by the resolver afterwards, so
/// implementations can leave them at their defaults.
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Short tag recorded on records this source produced.
    fn name(&self) -> &str;

    async fn resolve(&self, domain: &str) -> Result<DomainRecord>;
}
