use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::AccessibilityResult;
use crate::cookie::CookieRecord;
use crate::request::NetworkRequest;
use crate::state::{Issue, StateTag};

/// Sealed observation of one consent state.
///
/// Built through [`SnapshotBuilder`]; once sealed there is no mutation path,
/// which is what makes downstream classification safe to re-run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: StateTag,
    pub cookies: Vec<CookieRecord>,
    pub requests: Vec<NetworkRequest>,
    pub accessibility: Option<AccessibilityResult>,
    pub capture_start: DateTime<Utc>,
    pub capture_end: DateTime<Utc>,
    pub issues: Vec<Issue>,
}

impl StateSnapshot {
    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    pub fn has_fatal_issue(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == crate::state::Severity::Fatal)
    }
}

/// Mutable capture state for one window. Consumed by [`SnapshotBuilder::seal`].
#[derive(Debug)]
pub struct SnapshotBuilder {
    state: StateTag,
    cookies: Vec<CookieRecord>,
    requests: Vec<NetworkRequest>,
    accessibility: Option<AccessibilityResult>,
    capture_start: DateTime<Utc>,
    issues: Vec<Issue>,
}

impl SnapshotBuilder {
    pub fn open(state: StateTag) -> Self {
        Self {
            state,
            cookies: Vec::new(),
            requests: Vec::new(),
            accessibility: None,
            capture_start: Utc::now(),
            issues: Vec::new(),
        }
    }

    pub fn state(&self) -> StateTag {
        self.state
    }

    /// First-observed order is preserved; callers append in arrival order.
    pub fn push_cookie(&mut self, cookie: CookieRecord) {
        self.cookies.push(cookie);
    }

    pub fn push_request(&mut self, request: NetworkRequest) {
        self.requests.push(request);
    }

    pub fn set_accessibility(&mut self, result: AccessibilityResult) {
        self.accessibility = Some(result);
    }

    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Closes the capture window. The builder is consumed, so no further
    /// mutation of the snapshot is possible.
    pub fn seal(self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            cookies: self.cookies,
            requests: self.requests,
            accessibility: self.accessibility,
            capture_start: self.capture_start,
            capture_end: Utc::now(),
            issues: self.issues,
        }
    }
}
