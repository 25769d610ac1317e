//! Domain name normalization.

use crate::error::{DossierError, Result};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalize user input into a bare, lower-case domain name.
///
/// Accepts URLs and FQDNs: the scheme, any path or port, a single trailing
/// root dot and a leading `www.` label are stripped. Unicode names are
/// converted to their punycode form. The result must have at least two labels
/// made of ASCII letters, digits and inner hyphens.
pub fn normalize_domain(input: &str) -> Result<String> {
    let lowered = input.trim().to_lowercase();

    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lowered);

    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_suffix('.').unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);

    let ascii;
    let host = if host.is_ascii() {
        host
    } else {
        ascii = idna::domain_to_ascii(host)
            .map_err(|_| DossierError::InvalidDomain(input.trim().to_string()))?;
        ascii.as_str()
    };

    if host.is_empty() || host.len() > MAX_DOMAIN_LEN || !host.contains('.') {
        return Err(DossierError::InvalidDomain(input.trim().to_string()));
    }

    for label in host.split('.') {
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(DossierError::InvalidDomain(input.trim().to_string()));
        }
    }

    Ok(host.to_string())
}
