//! Compliance classification and report payload.
//!
//! The classifier is a pure function from the provider match and the sealed
//! snapshots to an ordered set of flags: independently evaluable rules,
//! order-insensitive, tolerant of missing post-consent snapshots (those
//! flags come back not-evaluable with a cause, never a misleading false).
//! Re-running it on frozen inputs produces byte-identical report output.

pub mod flags;
pub mod report;

pub use flags::{ClassifierInput, state_flags, third_party_cookie_keys};
pub use report::{build_report, ReportInput};
