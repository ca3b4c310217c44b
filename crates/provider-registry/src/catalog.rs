//! Serde-loadable signature catalog.
//!
//! The catalog file is the configuration surface for provider signatures;
//! the built-in entries cover the providers the engine ships detection for
//! out of the box.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::signature::{MatchRule, ProviderSignature, RegistryError};

/// On-disk shape of one signature entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignatureSpec {
    pub provider: String,
    pub banner_ids: Vec<String>,
    #[serde(default)]
    pub banner_text: Vec<String>,
    pub accept_ids: Vec<String>,
    pub reject_ids: Vec<String>,
    #[serde(default)]
    pub manage_ids: Vec<String>,
    #[serde(default)]
    pub cookie_patterns: Vec<String>,
}

impl From<SignatureSpec> for ProviderSignature {
    fn from(spec: SignatureSpec) -> Self {
        let mut banner_rules: Vec<MatchRule> = spec
            .banner_ids
            .into_iter()
            .map(MatchRule::ElementId)
            .collect();
        banner_rules.extend(spec.banner_text.into_iter().map(MatchRule::TextContains));
        ProviderSignature {
            provider_name: spec.provider,
            banner_rules,
            accept_selectors: spec.accept_ids,
            reject_selectors: spec.reject_ids,
            manage_selectors: spec.manage_ids,
            cookie_name_patterns: spec.cookie_patterns,
        }
    }
}

/// Ordered catalog of provider signatures. Order defines match priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    pub version: u32,
    pub providers: Vec<SignatureSpec>,
}

impl CatalogFile {
    pub fn from_yaml_str(raw: &str) -> Result<Self, RegistryError> {
        serde_yaml::from_str(raw).map_err(|e| RegistryError::CatalogParse(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(raw).map_err(|e| RegistryError::CatalogParse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let raw =
            std::fs::read_to_string(path).map_err(|e| RegistryError::CatalogIo(e.to_string()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }

    /// Signatures the engine ships by default: OneTrust and TrustArc.
    pub fn builtin() -> Self {
        Self {
            version: 1,
            providers: vec![
                SignatureSpec {
                    provider: "OneTrust".into(),
                    banner_ids: vec!["onetrust-banner-sdk".into(), "onetrust-consent-sdk".into()],
                    banner_text: vec!["onetrust".into()],
                    accept_ids: vec![
                        "onetrust-accept-btn-handler".into(),
                        "accept-all-cookies-button".into(),
                    ],
                    reject_ids: vec![
                        "onetrust-reject-all-handler".into(),
                        "reject-all-cookies-button".into(),
                    ],
                    manage_ids: vec![
                        "onetrust-pc-btn-handler".into(),
                        "cookie-settings-button".into(),
                    ],
                    cookie_patterns: vec!["OptanonConsent".into(), "OptanonAlertBoxClosed".into()],
                },
                SignatureSpec {
                    provider: "TrustArc".into(),
                    banner_ids: vec![
                        "truste-consent-track".into(),
                        "truste-consent-button".into(),
                        "truste-cookie-button".into(),
                    ],
                    banner_text: vec!["trustarc".into()],
                    accept_ids: vec![
                        "truste-consent-button".into(),
                        "truste-cookie-accept".into(),
                    ],
                    reject_ids: vec![
                        "reject-all-cookies".into(),
                        "truste-cookie-reject".into(),
                        "truste-consent-required".into(),
                    ],
                    manage_ids: vec![
                        "truste-show-options".into(),
                        "truste-cookie-preferences".into(),
                        "truste-show-consent".into(),
                    ],
                    cookie_patterns: vec!["notice_behavior".into(), "cmapi_cookie_privacy".into()],
                },
            ],
        }
    }
}
