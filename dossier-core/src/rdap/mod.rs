mod client;
mod types;

pub use client::{RdapClient, DEFAULT_TIMEOUT};
pub use types::{RdapEntity, RdapEvent, RdapNameserver, RdapResponse, SecureDns};
