//! Pre-consent page interactability probe.
//!
//! Attempts a small fixed sequence of synthetic interactions — a viewport
//! scroll and a click on a neutral page element — and folds the outcomes
//! into a cookie-wall verdict. One success anywhere means the page is
//! interactable; only a full sweep of failures reports a wall.

use tracing::debug;

use browser_adapter::{scripts, AdapterError, BrowserAdapter, SessionHandle};
use consentscope_core_types::{AccessibilityResult, InteractionKind, InteractionOutcome};

/// Runs the probe during the pre-consent window only.
pub struct AccessibilityProbe;

impl AccessibilityProbe {
    pub async fn run(
        adapter: &dyn BrowserAdapter,
        session: &SessionHandle,
    ) -> AccessibilityResult {
        let mut interactions = Vec::with_capacity(2);
        interactions.push(
            Self::attempt(
                adapter,
                session,
                InteractionKind::Scroll,
                scripts::SCROLL_PROBE,
                "viewport scroll by 100px",
            )
            .await,
        );
        interactions.push(
            Self::attempt(
                adapter,
                session,
                InteractionKind::Click,
                scripts::NEUTRAL_CLICK_PROBE,
                "click on a neutral page link",
            )
            .await,
        );

        let result = AccessibilityResult::from_interactions(interactions);
        debug!(
            page_not_interactable = result.page_not_interactable,
            can_scroll = result.can_scroll,
            "accessibility probe finished"
        );
        result
    }

    async fn attempt(
        adapter: &dyn BrowserAdapter,
        session: &SessionHandle,
        kind: InteractionKind,
        script: &str,
        label: &str,
    ) -> InteractionOutcome {
        match adapter.execute_script(session, script).await {
            Ok(value) => {
                let succeeded = value.as_bool().unwrap_or(false);
                InteractionOutcome {
                    kind,
                    succeeded,
                    detail: if succeeded {
                        format!("{label} succeeded")
                    } else {
                        format!("{label} was intercepted")
                    },
                }
            }
            Err(err) => Self::failed(kind, label, &err),
        }
    }

    fn failed(kind: InteractionKind, label: &str, err: &AdapterError) -> InteractionOutcome {
        InteractionOutcome {
            kind,
            succeeded: false,
            detail: format!("{label} failed: {err}"),
        }
    }
}
