use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use browser_adapter::BrowserAdapter;
use compliance::{build_report, ReportInput};
use consent_flow::{ConsentStateMachine, Session};
use provider_registry::{CatalogFile, ProviderRegistry};

use crate::config::EngineConfig;

/// Completed analysis: the sealed session plus the derived report payload.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub session: Session,
    pub report: Value,
}

/// Engine facade: wires the signature catalog, the state machine and the
/// classifier behind one entry point.
pub struct Engine {
    adapter: Arc<dyn BrowserAdapter>,
    registry: Arc<ProviderRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Builds an engine from configuration, loading the provider catalog
    /// from `catalog_path` when one is set.
    pub fn new(adapter: Arc<dyn BrowserAdapter>, config: EngineConfig) -> Result<Self> {
        let registry = match &config.catalog_path {
            Some(path) => {
                let catalog = CatalogFile::load(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?;
                ProviderRegistry::from_catalog(catalog).context("invalid provider catalog")?
            }
            None => ProviderRegistry::with_builtin(),
        };
        Ok(Self::with_registry(adapter, Arc::new(registry), config))
    }

    pub fn with_registry(
        adapter: Arc<dyn BrowserAdapter>,
        registry: Arc<ProviderRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            adapter,
            registry,
            config,
        }
    }

    /// Runs the full consent analysis for one target and derives the report.
    ///
    /// Never fails on in-run problems — those surface as issues inside the
    /// report; partial results are always returned.
    pub async fn analyze(&self, target_url: &str) -> Analysis {
        let machine = ConsentStateMachine::new(
            Arc::clone(&self.adapter),
            Arc::clone(&self.registry),
            self.config.flow.clone(),
        );
        let session = machine.run(target_url).await;
        let report = report_for(&session);
        info!(
            target = target_url,
            banner = session.banner_found(),
            "analysis finished"
        );
        Analysis { session, report }
    }
}

/// Derives the report payload from a sealed session. Pure; calling it twice
/// on the same session yields byte-identical JSON.
pub fn report_for(session: &Session) -> Value {
    build_report(&ReportInput {
        target_url: &session.target_url,
        target_etld1: &session.target_etld1,
        provider: session.provider.as_ref(),
        snapshots: &session.snapshots,
        accept_action: session.accept_action.as_ref(),
        reject_action: session.reject_action.as_ref(),
        run_issues: &session.issues,
    })
}
