use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable bounds for every wait the state machine performs. All waits are
/// bounded; exhausting one records an issue instead of hanging.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Navigation timeout per state entry.
    pub nav_timeout_ms: u64,
    /// Bound on the document-ready poll after navigation.
    pub page_ready_timeout_ms: u64,
    /// First banner-poll interval; doubles up to the cap below.
    pub banner_poll_initial_ms: u64,
    pub banner_poll_max_ms: u64,
    /// Total bound on banner detection.
    pub banner_timeout_ms: u64,
    /// Settle window before a snapshot is sealed.
    pub settle_ms: u64,
    /// Run the accept and reject sub-runs concurrently. They share no
    /// mutable state after PreConsent seals, so this is safe; it costs one
    /// extra live browser session.
    pub parallel_subruns: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            nav_timeout_ms: 10_000,
            page_ready_timeout_ms: 10_000,
            banner_poll_initial_ms: 200,
            banner_poll_max_ms: 1_600,
            banner_timeout_ms: 5_000,
            settle_ms: 1_000,
            parallel_subruns: true,
        }
    }
}

impl FlowConfig {
    /// Fast bounds for scripted backends; keeps the test suite snappy.
    pub fn fast() -> Self {
        Self {
            nav_timeout_ms: 1_000,
            page_ready_timeout_ms: 200,
            banner_poll_initial_ms: 10,
            banner_poll_max_ms: 40,
            banner_timeout_ms: 100,
            settle_ms: 10,
            parallel_subruns: true,
        }
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    pub fn page_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.page_ready_timeout_ms)
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
