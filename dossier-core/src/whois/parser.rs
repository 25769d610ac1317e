//! Generic WHOIS grammar.
//!
//! Registries disagree on field names and layout but nearly all of them emit
//! either `Key: value` lines (gTLD style) or a `Key:` header followed by
//! indented value lines (Nominet and friends). Both shapes are folded into
//! one list of entries, and fields are then picked by alias. Dates are kept
//! as the raw text the registry sent; normalizing them is the caller's job.

use serde::{Deserialize, Serialize};

use crate::error::{DossierError, Result};

const REGISTRAR_KEYS: &[&str] = &[
    "registrar",
    "registrar name",
    "sponsoring registrar",
    "registrar organization",
    "registrar-name",
];

const NAMESERVER_KEYS: &[&str] = &[
    "name server",
    "name servers",
    "nameserver",
    "nameservers",
    "nserver",
    "ns",
];

const STATUS_KEYS: &[&str] = &[
    "domain status",
    "status",
    "state",
    "registration status",
];

const CREATED_KEYS: &[&str] = &[
    "creation date",
    "created date",
    "created on",
    "created",
    "registered on",
    "registered",
    "registration date",
    "registration time",
    "domain registration date",
    "record created",
];

const UPDATED_KEYS: &[&str] = &[
    "updated date",
    "last updated on",
    "last updated",
    "last modified",
    "last update",
    "modified",
    "changed",
];

const EXPIRES_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires on",
    "expires",
    "expire date",
    "expiration time",
    "paid-till",
    "renewal date",
];

const DNSSEC_KEYS: &[&str] = &["dnssec", "dnssec status"];

const NOT_FOUND_MARKERS: &[&str] = &[
    "no match for",
    "not found",
    "no data found",
    "no entries found",
    "no object found",
    "object does not exist",
    "status: free",
    "status: available",
];

const RATE_LIMIT_MARKERS: &[&str] = &[
    "limit exceeded",
    "too many requests",
    "query rate",
    "try again later",
];

/// Structured fields pulled out of a raw WHOIS response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub registrar: Option<String>,
    pub nameservers: Vec<String>,
    pub status: Vec<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub expiration_date: Option<String>,
    pub dnssec: Option<String>,
}

impl WhoisRecord {
    fn is_empty(&self) -> bool {
        self.registrar.is_none()
            && self.nameservers.is_empty()
            && self.created_date.is_none()
            && self.updated_date.is_none()
            && self.expiration_date.is_none()
    }
}

/// Parses raw WHOIS text into a [`WhoisRecord`].
///
/// Fails when the text is empty, reports that the domain does not exist or
/// that the query was rate limited, or contains no recognizable field.
pub fn parse_whois(raw: &str) -> Result<WhoisRecord> {
    if raw.trim().is_empty() {
        return Err(DossierError::WhoisParse("empty response".to_string()));
    }

    let entries = collect_entries(raw);

    let record = WhoisRecord {
        registrar: first_value(&entries, REGISTRAR_KEYS),
        nameservers: collect_tokens(&entries, NAMESERVER_KEYS, true),
        status: collect_tokens(&entries, STATUS_KEYS, false),
        created_date: first_value(&entries, CREATED_KEYS),
        updated_date: first_value(&entries, UPDATED_KEYS),
        expiration_date: first_value(&entries, EXPIRES_KEYS),
        dnssec: first_value(&entries, DNSSEC_KEYS),
    };

    if record.is_empty() {
        let lower = raw.to_lowercase();
        if RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m)) {
            return Err(DossierError::WhoisParse("query limit exceeded".to_string()));
        }
        if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
            return Err(DossierError::WhoisParse("domain is not found".to_string()));
        }
        return Err(DossierError::WhoisParse("domain data is invalid".to_string()));
    }

    Ok(record)
}

#[derive(Debug)]
struct Entry {
    key: String,
    values: Vec<String>,
}

fn collect_entries(raw: &str) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    // Index of the `Key:` header whose indented lines are being read.
    let mut block: Option<usize> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            block = None;
            continue;
        }
        if trimmed.starts_with('%') || trimmed.starts_with('#') || trimmed.starts_with(">>>") {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if let (Some(header), true) = (block, indented) {
            // Section blocks such as "Relevant dates:" nest `Key: value` lines.
            let nested = split_key_value(trimmed)
                .filter(|(key, value)| is_label(key) && !value.is_empty());
            match nested {
                Some((key, value)) => {
                    // EURid names the registrar inside its "Registrar:" block.
                    if key == "name" && REGISTRAR_KEYS.contains(&entries[header].key.as_str()) {
                        entries[header].values.push(value.clone());
                    }
                    entries.push(Entry {
                        key,
                        values: vec![value],
                    });
                }
                None => entries[header].values.push(trimmed.to_string()),
            }
            continue;
        }
        block = None;

        let Some((key, value)) = split_key_value(trimmed) else {
            continue;
        };
        if value.is_empty() {
            block = Some(entries.len());
            entries.push(Entry { key, values: Vec::new() });
        } else {
            entries.push(Entry {
                key,
                values: vec![value],
            });
        }
    }

    entries
}

fn split_key_value(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim().to_lowercase();
    if key.is_empty() || key.len() > 48 || key.contains("http") {
        return None;
    }
    Some((key, value.trim().to_string()))
}

/// Field labels are words; this keeps `host 2001:db8::1` style values intact.
fn is_label(key: &str) -> bool {
    key.chars()
        .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-' || c == '_')
}

fn usable(value: &str) -> bool {
    !value.is_empty() && !value.eq_ignore_ascii_case("redacted")
}

/// First usable value of the first alias (in alias order) present in the text.
fn first_value(entries: &[Entry], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        entries
            .iter()
            .filter(|e| e.key == *key)
            .flat_map(|e| e.values.iter())
            .find(|v| usable(v))
            .cloned()
    })
}

/// Every value under any alias, reduced to its first word, de-duplicated in
/// order of appearance. Status lines carry a trailing ICANN URL that is dropped
/// this way.
fn collect_tokens(entries: &[Entry], keys: &[&str], hostnames: bool) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();

    for entry in entries.iter().filter(|e| keys.contains(&e.key.as_str())) {
        for value in &entry.values {
            let Some(word) = value.split_whitespace().next() else {
                continue;
            };
            let token = if hostnames {
                word.trim_end_matches('.').to_lowercase()
            } else {
                word.to_string()
            };
            if usable(&token) && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN: &str = "   Domain Name: EXAMPLE.COM\r
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.iana.org\r
   Updated Date: 2024-08-14T07:01:34Z\r
   Creation Date: 1995-08-14T04:00:00Z\r
   Registry Expiry Date: 2025-08-13T04:00:00Z\r
   Registrar: RESERVED-Internet Assigned Numbers Authority\r
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r
   Name Server: A.IANA-SERVERS.NET\r
   Name Server: B.IANA-SERVERS.NET\r
   DNSSEC: signedDelegation\r
>>> Last update of whois database: 2024-10-01T12:00:00Z <<<\r
";

    const NOMINET: &str = "
    Domain name:
        example.co.uk

    Registrar:
        Example Registrar Ltd [Tag = EXAMPLE]
        URL: https://registrar.example

    Relevant dates:
        Registered on: 26-Aug-1996
        Expiry date:  26-Aug-2026
        Last updated:  12-Jul-2024

    Registration status:
        Registered until expiry date.

    Name servers:
        ns1.example.net
        ns2.example.net
";

    const EURID: &str = "Domain: example.eu
Script: LATIN

Registrant:
        NOT DISCLOSED!
        Visit www.eurid.eu for webbased WHOIS.

Technical:
        Organisation: Example Hosting NV
        Language: en

Registrar:
        Name: Example Registrar BV
        Website: https://registrar.example

Name servers:
        ns1.example.net
        ns2.example.net (2001:db8::53)
";

    #[test]
    fn test_parse_gtld_response() {
        let record = parse_whois(VERISIGN).unwrap();

        assert_eq!(
            record.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(record.created_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert_eq!(record.updated_date.as_deref(), Some("2024-08-14T07:01:34Z"));
        assert_eq!(record.expiration_date.as_deref(), Some("2025-08-13T04:00:00Z"));
        assert_eq!(
            record.nameservers,
            vec!["a.iana-servers.net".to_string(), "b.iana-servers.net".to_string()]
        );
        assert_eq!(
            record.status,
            vec![
                "clientDeleteProhibited".to_string(),
                "clientTransferProhibited".to_string()
            ]
        );
        assert_eq!(record.dnssec.as_deref(), Some("signedDelegation"));
    }

    #[test]
    fn test_parse_block_layout() {
        let record = parse_whois(NOMINET).unwrap();

        assert_eq!(
            record.registrar.as_deref(),
            Some("Example Registrar Ltd [Tag = EXAMPLE]")
        );
        assert_eq!(
            record.nameservers,
            vec!["ns1.example.net".to_string(), "ns2.example.net".to_string()]
        );
        assert_eq!(record.status, vec!["Registered".to_string()]);
        assert_eq!(record.created_date.as_deref(), Some("26-Aug-1996"));
        assert_eq!(record.expiration_date.as_deref(), Some("26-Aug-2026"));
        assert_eq!(record.updated_date.as_deref(), Some("12-Jul-2024"));
    }

    #[test]
    fn test_nested_fields_stay_out_of_block_values() {
        let record = parse_whois(EURID).unwrap();

        assert_eq!(record.registrar.as_deref(), Some("Example Registrar BV"));
        assert_eq!(
            record.nameservers,
            vec!["ns1.example.net".to_string(), "ns2.example.net".to_string()]
        );
    }

    #[test]
    fn test_first_alias_wins() {
        let raw = "Expires: 2030-01-01\nRegistry Expiry Date: 2029-01-01\nRegistrar: R\n";
        let record = parse_whois(raw).unwrap();
        assert_eq!(record.expiration_date.as_deref(), Some("2029-01-01"));
    }

    #[test]
    fn test_redacted_values_are_skipped() {
        let raw = "Registrar: REDACTED\nSponsoring Registrar: Real Registrar\n";
        let record = parse_whois(raw).unwrap();
        assert_eq!(record.registrar.as_deref(), Some("Real Registrar"));
    }

    #[test]
    fn test_not_found_is_an_error() {
        let err = parse_whois("No match for \"NOPE.COM\".\r\n").unwrap_err();
        assert_eq!(err.source_tag(), "WHOIS Parser");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_rate_limit_is_an_error() {
        let err = parse_whois("Query rate limit exceeded. Try again later.\n").unwrap_err();
        assert!(err.to_string().contains("limit exceeded"));
    }

    #[test]
    fn test_empty_and_unrecognized_are_errors() {
        assert!(parse_whois("").is_err());
        assert!(parse_whois("   \n\n").is_err());
        let err = parse_whois("hello world\nnothing to see here\n").unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }
}
