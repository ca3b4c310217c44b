use serde::{Deserialize, Serialize};

/// Outcome of the consent action a sub-run attempted (accept or reject).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConsentActionOutcome {
    /// An action was attempted at all (a banner was present to act on).
    pub performed: bool,
    /// The click went through.
    pub successful: bool,
    /// A visible action button was found.
    pub button_found: bool,
    /// The selector that was clicked, when one was.
    pub selector: Option<String>,
}

impl ConsentActionOutcome {
    pub fn not_performed() -> Self {
        Self {
            performed: false,
            successful: false,
            button_found: false,
            selector: None,
        }
    }

    pub fn clicked(selector: impl Into<String>) -> Self {
        Self {
            performed: true,
            successful: true,
            button_found: true,
            selector: Some(selector.into()),
        }
    }

    pub fn button_missing() -> Self {
        Self {
            performed: true,
            successful: false,
            button_found: false,
            selector: None,
        }
    }
}
