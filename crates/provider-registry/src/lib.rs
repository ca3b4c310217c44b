//! CCM provider signature catalog and banner matching.
//!
//! The registry holds an ordered set of provider signatures and evaluates
//! them against a static [`DomSnapshot`]. It performs no browser interaction
//! itself; registration order defines priority and malformed signatures are
//! rejected up front, so a run-time "no match" always means
//! absence-of-banner rather than bad configuration.

pub mod catalog;
pub mod dom;
pub mod registry;
pub mod signature;

pub use catalog::{CatalogFile, SignatureSpec};
pub use dom::DomSnapshot;
pub use registry::{MatchConfidence, ProviderMatch, ProviderRegistry};
pub use signature::{MatchRule, ProviderSignature, RegistryError};
