//! Final report payload.
//!
//! One JSON document: banner identity, flag objects per consent state, the
//! request forest per state for the external chain renderer, per-state
//! summaries and every issue verbatim. Serialization is deterministic
//! (sorted object keys, sequence order fixed by the inputs), so re-running
//! the classifier on frozen snapshots is byte-identical.

use serde_json::{json, Map, Value};
use tracing::debug;

use consentscope_core_types::{
    ComplianceFlag, ConsentActionOutcome, CookieClass, FlagValue, Initiator, Issue, StateSnapshot,
    StateTag,
};
use provider_registry::ProviderMatch;

use crate::flags::{state_flags, ClassifierInput};

/// Everything the report is derived from; all borrowed, nothing mutated.
#[derive(Clone, Copy)]
pub struct ReportInput<'a> {
    pub target_url: &'a str,
    pub target_etld1: &'a str,
    pub provider: Option<&'a ProviderMatch>,
    pub snapshots: &'a [StateSnapshot],
    pub accept_action: Option<&'a ConsentActionOutcome>,
    pub reject_action: Option<&'a ConsentActionOutcome>,
    pub run_issues: &'a [Issue],
}

impl<'a> ReportInput<'a> {
    fn snapshot(&self, state: StateTag) -> Option<&'a StateSnapshot> {
        self.snapshots.iter().find(|s| s.state == state)
    }
}

const REPORT_STATES: [StateTag; 3] = [StateTag::PreConsent, StateTag::Accepted, StateTag::Rejected];

pub fn build_report(input: &ReportInput<'_>) -> Value {
    let classifier_input = ClassifierInput {
        provider: input.provider,
        pre_consent: input.snapshot(StateTag::PreConsent),
        accepted: input.snapshot(StateTag::Accepted),
        rejected: input.snapshot(StateTag::Rejected),
        accept_action: input.accept_action,
        reject_action: input.reject_action,
    };

    let mut root = Map::new();
    root.insert(
        "target".into(),
        json!({ "url": input.target_url, "etld1": input.target_etld1 }),
    );
    root.insert(
        "ccm_banner".into(),
        json!({
            "banner_found": input.provider.is_some(),
            "provider_name": input.provider.map(|p| p.provider_name.as_str()).unwrap_or(""),
        }),
    );

    for state in REPORT_STATES {
        let flags = state_flags(state, &classifier_input);
        root.insert(state.report_key().into(), flags_object(&flags));
    }

    root.insert("networkChains".into(), network_chains(input));
    root.insert("summaries".into(), summaries(input));
    root.insert("issues".into(), issues(input));

    debug!(states = input.snapshots.len(), "report assembled");
    Value::Object(root)
}

fn flags_object(flags: &[ComplianceFlag]) -> Value {
    let mut object = Map::new();
    for flag in flags {
        let entry = match &flag.value {
            FlagValue::Bool(value) => json!({
                "value": value,
                "outlook": flag.outlook,
                "meaning": flag.meaning,
            }),
            FlagValue::NotEvaluable(cause) => json!({
                "value": "notEvaluable",
                "cause": cause,
                "outlook": flag.outlook,
                "meaning": flag.meaning,
            }),
        };
        object.insert(flag.id.clone(), entry);
    }
    Value::Object(object)
}

/// Nodes and parent→child edges per state. Requests with an unresolved
/// initiator hang off an explicit synthetic node so the renderer shows them
/// as their own cluster instead of merging them under page navigation.
fn network_chains(input: &ReportInput<'_>) -> Value {
    let mut chains = Map::new();
    for snapshot in input.snapshots {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut needs_unresolved_node = false;

        for request in &snapshot.requests {
            nodes.push(json!({
                "id": request.id.0,
                "url": request.url,
                "type": request.resource_type,
                "analytics": request.analytics,
            }));
            match &request.initiator {
                Initiator::Root => {}
                Initiator::Parent(parent) => {
                    edges.push(json!({ "parent": parent.0, "child": request.id.0 }));
                }
                Initiator::Unresolved => {
                    needs_unresolved_node = true;
                    edges.push(json!({ "parent": "unresolved", "child": request.id.0 }));
                }
            }
        }
        if needs_unresolved_node {
            nodes.push(json!({
                "id": "unresolved",
                "url": "",
                "type": "synthetic",
                "analytics": false,
            }));
        }
        chains.insert(
            snapshot.state.report_key().into(),
            json!({ "nodes": nodes, "edges": edges }),
        );
    }
    Value::Object(chains)
}

fn summaries(input: &ReportInput<'_>) -> Value {
    let mut summaries = Map::new();
    for snapshot in input.snapshots {
        let third_party = snapshot
            .cookies
            .iter()
            .filter(|c| c.classification == CookieClass::ThirdParty)
            .count();
        summaries.insert(
            snapshot.state.report_key().into(),
            json!({
                "cookies": snapshot.cookies.len(),
                "thirdPartyCookies": third_party,
                "requests": snapshot.requests.len(),
                "captureStart": snapshot.capture_start.to_rfc3339(),
                "captureEnd": snapshot.capture_end.to_rfc3339(),
            }),
        );
    }
    Value::Object(summaries)
}

fn issues(input: &ReportInput<'_>) -> Value {
    let mut all: Vec<Value> = Vec::new();
    for snapshot in input.snapshots {
        for issue in &snapshot.issues {
            all.push(issue_value(issue));
        }
    }
    for issue in input.run_issues {
        all.push(issue_value(issue));
    }
    Value::Array(all)
}

fn issue_value(issue: &Issue) -> Value {
    json!({
        "state": issue.state.report_key(),
        "severity": issue.severity,
        "message": issue.message,
    })
}
