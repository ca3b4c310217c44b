use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::DomSnapshot;

#[derive(Clone, Debug, Error)]
pub enum RegistryError {
    #[error("malformed signature for '{provider}': {reason}")]
    MalformedSignature { provider: String, reason: String },
    #[error("catalog read failed: {0}")]
    CatalogIo(String),
    #[error("catalog parse failed: {0}")]
    CatalogParse(String),
}

/// One banner-presence rule, evaluated against a [`DomSnapshot`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MatchRule {
    /// An element with this id exists in the DOM.
    ElementId(String),
    /// The page text contains this needle.
    TextContains(String),
}

impl MatchRule {
    pub fn matches(&self, dom: &DomSnapshot) -> bool {
        match self {
            MatchRule::ElementId(id) => dom.has_element(id),
            MatchRule::TextContains(needle) => dom.text_contains(needle),
        }
    }
}

/// Signature of one consent-management provider.
///
/// Selectors are element ids, in priority order; the first visible one is
/// the click target. Cookie-name patterns feed the collector's
/// `CcmProvider` classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderSignature {
    pub provider_name: String,
    pub banner_rules: Vec<MatchRule>,
    pub accept_selectors: Vec<String>,
    pub reject_selectors: Vec<String>,
    pub manage_selectors: Vec<String>,
    pub cookie_name_patterns: Vec<String>,
}

impl ProviderSignature {
    /// Required fields are checked at registration time, not at match time.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let fail = |reason: &str| RegistryError::MalformedSignature {
            provider: self.provider_name.clone(),
            reason: reason.to_string(),
        };
        if self.provider_name.trim().is_empty() {
            return Err(fail("empty provider name"));
        }
        if self.banner_rules.is_empty() {
            return Err(fail("no banner presence rules"));
        }
        if self.accept_selectors.is_empty() {
            return Err(fail("no accept-action selectors"));
        }
        if self.reject_selectors.is_empty() {
            return Err(fail("no reject-action selectors"));
        }
        Ok(())
    }
}
