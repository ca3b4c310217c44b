//! Per-state cookie and network attribution.
//!
//! A [`CaptureWindow`] subscribes to the browser's push-style event stream
//! for one consent state, buffers events in arrival order without ever
//! blocking page load, and on close resolves them into the ordered cookie
//! and request sequences the snapshot seals.

pub mod classify;
pub mod collector;
pub mod forest;

pub use classify::{is_analytics_url, CookieResolver, ANALYTICS_LOADER_PATTERNS};
pub use collector::{CaptureOutcome, CaptureWindow};
pub use forest::forest_is_well_formed;
