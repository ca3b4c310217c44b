use serde::{Deserialize, Serialize};

use consentscope_core_types::{ConsentActionOutcome, Issue, RunId, StateSnapshot, StateTag};
use provider_registry::ProviderMatch;

/// Completed analysis run: target identity, sealed snapshots in state-entry
/// order, the terminal provider match and run-level issues. Immutable once
/// the machine returns it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub run_id: RunId,
    pub target_url: String,
    pub target_etld1: String,
    pub snapshots: Vec<StateSnapshot>,
    pub provider: Option<ProviderMatch>,
    pub accept_action: Option<ConsentActionOutcome>,
    pub reject_action: Option<ConsentActionOutcome>,
    pub issues: Vec<Issue>,
}

impl Session {
    pub fn snapshot(&self, state: StateTag) -> Option<&StateSnapshot> {
        self.snapshots.iter().find(|s| s.state == state)
    }

    pub fn banner_found(&self) -> bool {
        self.provider.is_some()
    }

    /// Issues from every sealed snapshot plus the run level, in order.
    pub fn all_issues(&self) -> Vec<&Issue> {
        self.snapshots
            .iter()
            .flat_map(|s| s.issues.iter())
            .chain(self.issues.iter())
            .collect()
    }
}
