//! Registrable-domain (eTLD+1) helpers used for first/third-party
//! classification. Backed by the compiled-in Public Suffix List.

use psl::{List, Psl};
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum DomainError {
    #[error("no host in url: {0}")]
    NoHost(String),
    #[error("no registrable domain in: {0}")]
    NoRegistrableDomain(String),
}

/// Extracts the registrable domain (eTLD+1) from a URL or bare host.
///
/// Handles multi-part public suffixes ("example.co.uk") via the suffix
/// list; IP hosts and single-label hosts are returned as-is since they have
/// no registrable domain to shorten to.
pub fn registrable_domain(input: &str) -> Result<String, DomainError> {
    let host = match url::Url::parse(input) {
        Ok(parsed) => parsed
            .host_str()
            .map(|h| h.to_string())
            .ok_or_else(|| DomainError::NoHost(input.to_string()))?,
        Err(_) => input.trim_start_matches('.').to_string(),
    };
    let host = host.to_ascii_lowercase();

    if host.parse::<std::net::IpAddr>().is_ok() || !host.contains('.') {
        return Ok(host);
    }

    match List.domain(host.as_bytes()) {
        Some(domain) => Ok(String::from_utf8_lossy(domain.as_bytes()).to_string()),
        None => fallback_base_domain(&host),
    }
}

// Last-two-labels fallback for hosts the suffix list cannot place.
fn fallback_base_domain(host: &str) -> Result<String, DomainError> {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    match labels.len() {
        0 => Err(DomainError::NoRegistrableDomain(host.to_string())),
        1 => Ok(labels[0].to_string()),
        n => Ok(format!("{}.{}", labels[n - 2], labels[n - 1])),
    }
}

/// Whether a cookie or request domain belongs to the target site.
///
/// True on an exact eTLD+1 match or any subdomain of it.
pub fn is_first_party(domain: &str, target_etld1: &str) -> bool {
    match registrable_domain(domain) {
        Ok(base) => base == target_etld1,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_base_domain_from_url() {
        assert_eq!(
            registrable_domain("https://www.example.com/path").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn extracts_base_domain_from_bare_host() {
        assert_eq!(
            registrable_domain(".analytics.example.com").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn subdomains_are_first_party() {
        assert!(is_first_party("shop.example.com", "example.com"));
        assert!(is_first_party("example.com", "example.com"));
        assert!(!is_first_party("tracker.ads.net", "example.com"));
    }

    #[test]
    fn multi_part_suffix_is_respected() {
        assert_eq!(
            registrable_domain("https://news.example.co.uk").unwrap(),
            "example.co.uk"
        );
    }

    #[test]
    fn ip_hosts_pass_through() {
        assert_eq!(registrable_domain("https://127.0.0.1/").unwrap(), "127.0.0.1");
    }
}
