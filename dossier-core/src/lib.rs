//! Domain registration lookups that race RDAP against WHOIS, normalize what
//! comes back and enrich it with live DNS.

pub mod cache;
pub mod config;
pub mod date;
pub mod dns;
pub mod error;
pub mod output;
pub mod rdap;
pub mod record;
pub mod resolver;
pub mod source;
pub mod style;
pub mod validation;
pub mod whois;

pub use cache::{Clock, ManualClock, RecordCache, SystemClock};
pub use config::LookupConfig;
pub use date::normalize_date;
pub use dns::{DnsRecords, DnsResolver, DnsTransport, HickoryTransport};
pub use error::{DossierError, Result};
pub use output::{OutputFormat, OutputFormatter};
pub use rdap::{RdapClient, RdapResponse};
pub use record::{DomainRecord, ExpiryCountdown};
pub use resolver::{DomainResolver, DomainResolverBuilder};
pub use source::{LookupSource, RdapSource, WhoisSource};
pub use validation::normalize_domain;
pub use whois::{parse_whois, WhoisClient, WhoisRecord, WhoisTransport};
