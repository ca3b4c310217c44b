//! Request-forest resolution.
//!
//! Each request carries the initiator reference the browser instrumentation
//! declared. Resolution attaches a request under its parent only when that
//! parent was observed earlier in the same window; a declared initiator the
//! window never saw resolves to the explicit `Unresolved` synthetic node,
//! never silently to the navigation root. The earlier-arrival rule makes the
//! forest acyclic by construction.

use std::collections::HashSet;

use browser_adapter::RequestEvent;
use consentscope_core_types::{Initiator, NetworkRequest, RequestId, StateTag};

use crate::classify::is_analytics_url;

/// Resolves buffered request events into the snapshot's ordered sequence.
/// Duplicate request ids keep the first occurrence.
pub fn resolve_requests(events: &[RequestEvent], state: StateTag) -> Vec<NetworkRequest> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut requests = Vec::with_capacity(events.len());

    for event in events {
        if !seen.insert(event.request_id.as_str()) {
            continue;
        }
        let initiator = match &event.initiator {
            None => Initiator::Root,
            Some(parent_id) => {
                // `seen` holds only earlier arrivals at this point, plus the
                // event's own id inserted above.
                if parent_id != &event.request_id && seen.contains(parent_id.as_str()) {
                    Initiator::Parent(RequestId::new(parent_id.clone()))
                } else {
                    Initiator::Unresolved
                }
            }
        };
        requests.push(NetworkRequest {
            id: RequestId::new(event.request_id.clone()),
            url: event.url.clone(),
            resource_type: event.resource_type,
            initiator,
            timestamp: event.timestamp,
            state,
            analytics: is_analytics_url(&event.url),
        });
    }
    requests
}

/// Every non-root parent reference must point at an earlier request in the
/// same sequence — the property the per-state invariant tests assert.
pub fn forest_is_well_formed(requests: &[NetworkRequest]) -> bool {
    let mut earlier: HashSet<&str> = HashSet::new();
    for request in requests {
        match &request.initiator {
            Initiator::Root | Initiator::Unresolved => {}
            Initiator::Parent(parent) => {
                if !earlier.contains(parent.0.as_str()) {
                    return false;
                }
                if requests
                    .iter()
                    .find(|r| r.id == *parent)
                    .map(|r| r.state != request.state)
                    .unwrap_or(true)
                {
                    return false;
                }
            }
        }
        earlier.insert(request.id.0.as_str());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use consentscope_core_types::ResourceType;

    fn event(id: &str, initiator: Option<&str>) -> RequestEvent {
        RequestEvent {
            request_id: id.into(),
            url: format!("https://example.com/{id}"),
            resource_type: ResourceType::Script,
            initiator: initiator.map(String::from),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn chains_attach_to_earlier_parents() {
        let events = vec![event("a", None), event("b", Some("a")), event("c", Some("b"))];
        let requests = resolve_requests(&events, StateTag::PreConsent);

        assert_eq!(requests[0].initiator, Initiator::Root);
        assert_eq!(
            requests[1].initiator,
            Initiator::Parent(RequestId::new("a"))
        );
        assert_eq!(
            requests[2].initiator,
            Initiator::Parent(RequestId::new("b"))
        );
        assert!(forest_is_well_formed(&requests));
    }

    #[test]
    fn unknown_initiator_becomes_explicit_unresolved() {
        let events = vec![event("a", None), event("b", Some("ghost"))];
        let requests = resolve_requests(&events, StateTag::PreConsent);
        assert_eq!(requests[1].initiator, Initiator::Unresolved);
        assert!(forest_is_well_formed(&requests));
    }

    #[test]
    fn forward_reference_does_not_form_a_cycle() {
        // b declares c as parent, but c arrives later: attach point is the
        // synthetic unresolved node, not a cycle.
        let events = vec![event("a", None), event("b", Some("c")), event("c", Some("b"))];
        let requests = resolve_requests(&events, StateTag::PreConsent);
        assert_eq!(requests[1].initiator, Initiator::Unresolved);
        assert_eq!(
            requests[2].initiator,
            Initiator::Parent(RequestId::new("b"))
        );
        assert!(forest_is_well_formed(&requests));
    }

    #[test]
    fn self_reference_is_unresolved() {
        let events = vec![event("a", Some("a"))];
        let requests = resolve_requests(&events, StateTag::PreConsent);
        assert_eq!(requests[0].initiator, Initiator::Unresolved);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut dup = event("a", None);
        dup.url = "https://example.com/redirected".into();
        let events = vec![event("a", None), dup];
        let requests = resolve_requests(&events, StateTag::PreConsent);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://example.com/a");
    }
}
