use serde::{Deserialize, Serialize};

/// Consent state a snapshot was captured in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum StateTag {
    PreConsent,
    Accepted,
    Rejected,
}

impl StateTag {
    /// Key used for this state in the report payload.
    pub fn report_key(self) -> &'static str {
        match self {
            StateTag::PreConsent => "preConsent",
            StateTag::Accepted => "postConsentAccept",
            StateTag::Rejected => "postConsentReject",
        }
    }
}

impl std::fmt::Display for StateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.report_key())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Fatal,
}

/// Non-fatal or fatal problem observed during a state window.
///
/// Issues are accumulated, never removed, and surfaced verbatim in the final
/// report.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub state: StateTag,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    pub fn warning(state: StateTag, message: impl Into<String>) -> Self {
        Self {
            state,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn fatal(state: StateTag, message: impl Into<String>) -> Self {
        Self {
            state,
            severity: Severity::Fatal,
            message: message.into(),
        }
    }
}
