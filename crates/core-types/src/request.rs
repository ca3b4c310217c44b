use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RequestId;
use crate::state::StateTag;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Script,
    Stylesheet,
    Image,
    Xhr,
    Fetch,
    Font,
    Media,
    Other,
}

impl Default for ResourceType {
    fn default() -> Self {
        ResourceType::Other
    }
}

/// Causal parent of a request within its state window.
///
/// `Unresolved` is an explicit synthetic attachment point: a declared
/// initiator the window never observed. Keeping it distinct from `Root`
/// stops unrelated chains from silently merging under page navigation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Initiator {
    Root,
    Parent(RequestId),
    Unresolved,
}

/// One network request observed during a capture window.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub id: RequestId,
    pub url: String,
    pub resource_type: ResourceType,
    pub initiator: Initiator,
    pub timestamp: DateTime<Utc>,
    pub state: StateTag,
    /// Classification overlay: the URL matches a known analytics-loader
    /// pattern. Not a separate entity.
    pub analytics: bool,
}
