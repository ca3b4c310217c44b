//! Pure classification rules: cookie party attribution and the analytics
//! overlay.

use browser_adapter::RawCookie;
use consentscope_core_types::{domain, CookieClass, CookieRecord, StateTag};

/// Analytics container loads are detected by URL against this fixed set.
/// The match is an overlay on existing requests, not a separate entity.
pub const ANALYTICS_LOADER_PATTERNS: &[&str] = &[
    "googletagmanager.com",
    "google-analytics.com",
    "doubleclick.net",
    "gtag/js",
    "analytics.js",
    "assets.adobedtm.com",
    "omtrdc.net",
    "hs-analytics.net",
];

pub fn is_analytics_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ANALYTICS_LOADER_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Classifies cookies relative to one analysis target.
///
/// Classification is a pure function of (name, domain, target eTLD+1,
/// provider patterns): identical inputs always yield identical output.
#[derive(Clone, Debug)]
pub struct CookieResolver {
    target_etld1: String,
    provider_patterns: Vec<String>,
}

impl CookieResolver {
    pub fn new(target_etld1: impl Into<String>, provider_patterns: Vec<String>) -> Self {
        Self {
            target_etld1: target_etld1.into(),
            provider_patterns,
        }
    }

    pub fn target_etld1(&self) -> &str {
        &self.target_etld1
    }

    /// Domain identity takes precedence over name heuristics: a cookie on
    /// the target's eTLD+1 is first-party even when its name also matches a
    /// provider pattern.
    pub fn classify(&self, name: &str, cookie_domain: &str) -> CookieClass {
        if domain::is_first_party(cookie_domain, &self.target_etld1) {
            return CookieClass::FirstParty;
        }
        let lower = name.to_ascii_lowercase();
        if self
            .provider_patterns
            .iter()
            .any(|pattern| lower.contains(&pattern.to_ascii_lowercase()))
        {
            return CookieClass::CcmProvider;
        }
        CookieClass::ThirdParty
    }

    /// Builds the persisted record. Only the value length survives.
    pub fn record(&self, raw: &RawCookie, first_seen: StateTag) -> CookieRecord {
        CookieRecord {
            name: raw.name.clone(),
            domain: consentscope_core_types::cookie::normalize_cookie_domain(raw.domain.clone()),
            value_len: raw.value.len(),
            secure: raw.secure,
            http_only: raw.http_only,
            same_site: raw.same_site,
            classification: self.classify(&raw.name, &raw.domain),
            first_seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(patterns: &[&str]) -> CookieResolver {
        CookieResolver::new(
            "example.com",
            patterns.iter().map(|p| p.to_string()).collect(),
        )
    }

    #[test]
    fn first_party_by_exact_and_subdomain() {
        let r = resolver(&[]);
        assert_eq!(r.classify("session", "example.com"), CookieClass::FirstParty);
        assert_eq!(
            r.classify("session", ".shop.example.com"),
            CookieClass::FirstParty
        );
    }

    #[test]
    fn provider_pattern_beats_third_party() {
        let r = resolver(&["OptanonConsent"]);
        assert_eq!(
            r.classify("OptanonConsent", "cdn.cookielaw.org"),
            CookieClass::CcmProvider
        );
        assert_eq!(
            r.classify("_ga", "google-analytics.com"),
            CookieClass::ThirdParty
        );
    }

    #[test]
    fn domain_identity_beats_name_heuristics() {
        let r = resolver(&["OptanonConsent"]);
        // Name matches a provider pattern but lives on the target domain.
        assert_eq!(
            r.classify("OptanonConsent", "example.com"),
            CookieClass::FirstParty
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let r = resolver(&["OptanonConsent"]);
        let first = r.classify("_fbp", "facebook.com");
        let second = r.classify("_fbp", "facebook.com");
        assert_eq!(first, second);
    }

    #[test]
    fn analytics_overlay_matches_known_loaders() {
        assert!(is_analytics_url(
            "https://www.googletagmanager.com/gtm.js?id=GTM-XXXX"
        ));
        assert!(is_analytics_url("https://assets.adobedtm.com/launch.min.js"));
        assert!(!is_analytics_url("https://example.com/app.js"));
    }
}
