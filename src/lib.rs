//! Consentscope: consent state analysis engine.
//!
//! Drives a browser — behind the [`browser_adapter::BrowserAdapter`]
//! capability trait — through pre-consent, accept and reject states for a
//! target site, attributes cookies and network requests to each state, and
//! reduces the observations into labeled compliance flags plus a request
//! forest per state for external rendering.

pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::{report_for, Analysis, Engine};

// Re-exported so embedders only need this crate on their dependency list.
pub use browser_adapter::{BrowserAdapter, ScriptedAdapter, SessionHandle};
pub use consent_flow::{FlowConfig, Session};
pub use consentscope_core_types as core_types;
pub use provider_registry::{CatalogFile, ProviderRegistry};

/// Installs the global tracing subscriber with an env-filter directive
/// (e.g. `"consentscope=debug,info"`). Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
