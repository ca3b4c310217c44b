use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consentscope_core_types::{ResourceType, SameSiteMode};

/// Cookie as reported by the driver, value included. The engine strips the
/// value before anything is persisted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSiteMode,
}

impl RawCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".into(),
            secure: false,
            http_only: false,
            same_site: SameSiteMode::None,
        }
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    pub fn same_site(mut self, mode: SameSiteMode) -> Self {
        self.same_site = mode;
        self
    }
}

/// One request observed by the driver's network instrumentation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub request_id: String,
    pub url: String,
    pub resource_type: ResourceType,
    /// Request id of the initiator as the driver reports it; `None` means
    /// the page navigation itself.
    pub initiator: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Event stream payload for one capture window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NetworkEvent {
    Request(RequestEvent),
    CookieSet(RawCookie),
}
