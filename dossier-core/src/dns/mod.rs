mod records;
mod resolver;
mod transport;

pub use records::DnsRecords;
pub use resolver::{DnsResolver, DEFAULT_DNSSEC_SERVER};
pub use transport::{DnsTransport, HickoryTransport, DEFAULT_TIMEOUT};
