use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Queried for TLDs missing from the built-in table.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Registry WHOIS servers for the TLDs seen most often. Anything else is
/// discovered through IANA at query time.
static WHOIS_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("com", "whois.verisign-grs.com"),
        ("net", "whois.verisign-grs.com"),
        ("org", "whois.pir.org"),
        ("info", "whois.nic.info"),
        ("biz", "whois.nic.biz"),
        ("io", "whois.nic.io"),
        ("co", "whois.nic.co"),
        ("me", "whois.nic.me"),
        ("tv", "whois.nic.tv"),
        ("cc", "ccwhois.verisign-grs.com"),
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        ("page", "whois.nic.google"),
        ("xyz", "whois.nic.xyz"),
        ("ai", "whois.nic.ai"),
        ("uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("nl", "whois.domain-registry.nl"),
        ("eu", "whois.eu"),
        ("be", "whois.dns.be"),
        ("ch", "whois.nic.ch"),
        ("at", "whois.nic.at"),
        ("it", "whois.nic.it"),
        ("es", "whois.nic.es"),
        ("se", "whois.iis.se"),
        ("pl", "whois.dns.pl"),
        ("ru", "whois.tcinet.ru"),
        ("jp", "whois.jprs.jp"),
        ("kr", "whois.kr"),
        ("cn", "whois.cnnic.cn"),
        ("au", "whois.auda.org.au"),
        ("ca", "whois.cira.ca"),
        ("us", "whois.nic.us"),
        ("in", "whois.registry.in"),
        ("br", "whois.registro.br"),
    ]
    .into_iter()
    .collect()
});

pub fn get_whois_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld.to_lowercase().as_str()).copied()
}

pub fn get_tld(domain: &str) -> Option<&str> {
    domain.rsplit('.').next().filter(|tld| !tld.is_empty())
}
