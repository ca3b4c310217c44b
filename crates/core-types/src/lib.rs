//! Shared primitives for the consentscope analysis engine.
//!
//! Everything report-facing lives here so the collector, state machine and
//! classifier agree on one vocabulary: state tags, cookie and request
//! records, sealed snapshots, issues and compliance flags.

pub mod access;
pub mod action;
pub mod cookie;
pub mod domain;
pub mod flags;
pub mod ids;
pub mod request;
pub mod snapshot;
pub mod state;

pub use access::{AccessibilityResult, InteractionKind, InteractionOutcome};
pub use action::ConsentActionOutcome;
pub use cookie::{CookieClass, CookieKey, CookieRecord, SameSiteMode};
pub use domain::{is_first_party, registrable_domain, DomainError};
pub use flags::{ComplianceFlag, FlagValue, Outlook};
pub use ids::{RequestId, RunId, SubRunId};
pub use request::{Initiator, NetworkRequest, ResourceType};
pub use snapshot::{SnapshotBuilder, StateSnapshot};
pub use state::{Issue, Severity, StateTag};
