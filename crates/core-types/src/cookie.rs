use serde::{Deserialize, Serialize};

use crate::state::StateTag;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSiteMode {
    Strict,
    Lax,
    None,
}

impl Default for SameSiteMode {
    fn default() -> Self {
        SameSiteMode::None
    }
}

/// Party classification of a cookie relative to the analysis target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CookieClass {
    FirstParty,
    ThirdParty,
    CcmProvider,
}

/// Identity of a cookie within a jar: name plus normalized domain.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CookieKey {
    pub name: String,
    pub domain: String,
}

impl CookieKey {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: normalize_cookie_domain(domain.into()),
        }
    }
}

/// Leading dot on cookie domains is a wire artifact, not identity.
pub fn normalize_cookie_domain(domain: String) -> String {
    domain.trim_start_matches('.').to_ascii_lowercase()
}

/// Observation of one cookie within a state window.
///
/// The cookie value itself is never persisted; only its length is kept so
/// the report cannot leak session secrets.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub domain: String,
    pub value_len: usize,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSiteMode,
    pub classification: CookieClass,
    pub first_seen: StateTag,
}

impl CookieRecord {
    pub fn key(&self) -> CookieKey {
        CookieKey::new(self.name.clone(), self.domain.clone())
    }
}
