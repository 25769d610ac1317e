mod client;
mod parser;
mod servers;

pub use client::{WhoisClient, WhoisTransport, DEFAULT_TIMEOUT};
pub use parser::{parse_whois, WhoisRecord};
pub use servers::{get_tld, get_whois_server};
