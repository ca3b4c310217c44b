use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::{NetworkEvent, RawCookie};

/// Handle for one isolated browser session (own profile and cookie jar).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(pub Uuid);

impl SessionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, Error)]
pub enum AdapterError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("session closed")]
    SessionClosed,
    #[error("script execution failed: {0}")]
    ScriptFailed(String),
    #[error("internal adapter error: {0}")]
    Internal(String),
}

impl AdapterError {
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

/// Capability set of the underlying browser driver.
///
/// Implementations must deliver network events push-style: the stream is fed
/// by the driver's own instrumentation and replays events already observed
/// for the session, so subscribing after navigation does not lose the load
/// burst.
#[async_trait]
pub trait BrowserAdapter: Send + Sync {
    async fn new_isolated_session(&self) -> Result<SessionHandle, AdapterError>;

    async fn navigate(
        &self,
        session: &SessionHandle,
        url: &str,
        timeout: Duration,
    ) -> Result<(), AdapterError>;

    async fn wait_for_selector(
        &self,
        session: &SessionHandle,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AdapterError>;

    async fn click(&self, session: &SessionHandle, selector: &str) -> Result<(), AdapterError>;

    async fn get_cookies(&self, session: &SessionHandle) -> Result<Vec<RawCookie>, AdapterError>;

    async fn subscribe_network_events(
        &self,
        session: &SessionHandle,
    ) -> Result<mpsc::Receiver<NetworkEvent>, AdapterError>;

    async fn execute_script(
        &self,
        session: &SessionHandle,
        script: &str,
    ) -> Result<serde_json::Value, AdapterError>;

    async fn close(&self, session: SessionHandle) -> Result<(), AdapterError>;
}
