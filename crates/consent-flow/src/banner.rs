//! Banner detection: DOM snapshotting plus a bounded backoff poll.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use browser_adapter::{scripts, AdapterError, BrowserAdapter, SessionHandle};
use provider_registry::{DomSnapshot, ProviderMatch, ProviderRegistry};

use crate::config::FlowConfig;

/// Builds the static DOM snapshot the registry matches against. Two script
/// evaluations; the registry itself never touches the page.
pub async fn dom_snapshot(
    adapter: &dyn BrowserAdapter,
    session: &SessionHandle,
) -> Result<DomSnapshot, AdapterError> {
    let ids = adapter
        .execute_script(session, scripts::COLLECT_ELEMENT_IDS)
        .await?;
    let text = adapter
        .execute_script(session, scripts::COLLECT_PAGE_TEXT)
        .await?;

    let ids: Vec<String> = ids
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    let text = text.as_str().unwrap_or_default().to_string();
    Ok(DomSnapshot::new(ids, text))
}

/// Polls for a banner match until the configured bound, doubling the
/// interval up to its cap. Returns `None` on timeout or cancellation —
/// absence-of-banner, never an error.
pub async fn detect_banner(
    adapter: &dyn BrowserAdapter,
    session: &SessionHandle,
    registry: &ProviderRegistry,
    config: &FlowConfig,
    cancel: &CancellationToken,
) -> Result<Option<ProviderMatch>, AdapterError> {
    let deadline = Instant::now() + config.banner_timeout();
    let mut interval = Duration::from_millis(config.banner_poll_initial_ms.max(1));
    let interval_cap = Duration::from_millis(config.banner_poll_max_ms.max(1));

    loop {
        let dom = dom_snapshot(adapter, session).await?;
        if let Some(matched) = registry.match_snapshot(&dom) {
            debug!(provider = %matched.provider_name, "banner detected");
            return Ok(Some(matched));
        }
        if Instant::now() + interval > deadline {
            debug!("banner poll exhausted without a match");
            return Ok(None);
        }
        tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            _ = tokio::time::sleep(interval) => {}
        }
        interval = (interval * 2).min(interval_cap);
    }
}
