use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CatalogFile;
use crate::dom::DomSnapshot;
use crate::signature::{MatchRule, ProviderSignature, RegistryError};

/// How the banner was identified.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    /// A banner element was present in the DOM snapshot.
    Confirmed,
    /// Only text heuristics matched; no banner element was found.
    Heuristic,
}

/// Result of matching the catalog against a page, read-only afterward.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderMatch {
    pub provider_name: String,
    pub confidence: MatchConfidence,
    pub accept_selectors: Vec<String>,
    pub reject_selectors: Vec<String>,
    pub cookie_name_patterns: Vec<String>,
}

/// Ordered signature store; first registered wins ties. Read-only after
/// initialization, safe to share across concurrent sub-runs.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    signatures: Vec<ProviderSignature>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        Self::from_catalog(CatalogFile::builtin())
            .expect("built-in catalog entries are well-formed")
    }

    pub fn from_catalog(catalog: CatalogFile) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for spec in catalog.providers {
            registry.register(spec.into())?;
        }
        Ok(registry)
    }

    /// Rejects malformed signatures here so a run-time match failure is
    /// always attributable to absence-of-banner.
    pub fn register(&mut self, signature: ProviderSignature) -> Result<(), RegistryError> {
        signature.validate()?;
        debug!(provider = %signature.provider_name, "registered provider signature");
        self.signatures.push(signature);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Returns the highest-priority signature whose banner matches the
    /// snapshot, or `None` when no banner is present.
    ///
    /// A signature matches when its provider name appears in the page text
    /// and at least one banner rule holds.
    pub fn match_snapshot(&self, dom: &DomSnapshot) -> Option<ProviderMatch> {
        for signature in &self.signatures {
            if !dom.text_contains(&signature.provider_name) {
                continue;
            }
            let matched_rules: Vec<&MatchRule> = signature
                .banner_rules
                .iter()
                .filter(|rule| rule.matches(dom))
                .collect();
            if matched_rules.is_empty() {
                continue;
            }
            let confidence = if matched_rules
                .iter()
                .any(|rule| matches!(rule, MatchRule::ElementId(_)))
            {
                MatchConfidence::Confirmed
            } else {
                MatchConfidence::Heuristic
            };
            debug!(provider = %signature.provider_name, ?confidence, "banner matched");
            return Some(ProviderMatch {
                provider_name: signature.provider_name.clone(),
                confidence,
                accept_selectors: signature.accept_selectors.clone(),
                reject_selectors: signature.reject_selectors.clone(),
                cookie_name_patterns: signature.cookie_name_patterns.clone(),
            });
        }
        None
    }
}
