use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for one full analysis run (one target URL).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier for an isolated sub-run (the accept branch or the reject branch).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubRunId(pub Uuid);

impl SubRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubRunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Request identifier as supplied by the browser instrumentation.
///
/// Kept as the raw string the driver reports so initiator references can be
/// resolved without a translation table.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
