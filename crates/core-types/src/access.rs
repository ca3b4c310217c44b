use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Scroll,
    Click,
}

/// Outcome of one synthetic interaction attempted during the pre-consent
/// window.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub kind: InteractionKind,
    pub succeeded: bool,
    pub detail: String,
}

/// Result of the pre-consent accessibility probe.
///
/// `page_not_interactable` is true only when every attempted interaction
/// failed — a single success means the page is usable behind the banner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityResult {
    pub page_not_interactable: bool,
    pub can_scroll: bool,
    pub interactions: Vec<InteractionOutcome>,
}

impl AccessibilityResult {
    /// Folds interaction outcomes into the cookie-wall verdict.
    pub fn from_interactions(interactions: Vec<InteractionOutcome>) -> Self {
        let can_scroll = interactions
            .iter()
            .any(|i| i.kind == InteractionKind::Scroll && i.succeeded);
        let any_succeeded = interactions.iter().any(|i| i.succeeded);
        Self {
            page_not_interactable: !any_succeeded,
            can_scroll,
            interactions,
        }
    }
}
