use chrono::Utc;

use compliance::{build_report, ReportInput};
use consentscope_core_types::{
    AccessibilityResult, CookieClass, CookieRecord, Initiator, Issue, NetworkRequest, RequestId,
    ResourceType, SameSiteMode, SnapshotBuilder, StateSnapshot, StateTag,
};
use provider_registry::{MatchConfidence, ProviderMatch};

fn cookie(name: &str, domain: &str, class: CookieClass, state: StateTag) -> CookieRecord {
    CookieRecord {
        name: name.into(),
        domain: domain.into(),
        value_len: 8,
        secure: true,
        http_only: true,
        same_site: SameSiteMode::Lax,
        classification: class,
        first_seen: state,
    }
}

fn request(id: &str, url: &str, initiator: Initiator, state: StateTag) -> NetworkRequest {
    NetworkRequest {
        id: RequestId::new(id),
        url: url.into(),
        resource_type: ResourceType::Script,
        initiator,
        timestamp: Utc::now(),
        state,
        analytics: url.contains("analytics"),
    }
}

fn pre_consent() -> StateSnapshot {
    let mut builder = SnapshotBuilder::open(StateTag::PreConsent);
    builder.push_cookie(cookie(
        "session",
        "example.com",
        CookieClass::FirstParty,
        StateTag::PreConsent,
    ));
    builder.push_request(request(
        "nav-1",
        "https://example.com/",
        Initiator::Root,
        StateTag::PreConsent,
    ));
    builder.push_request(request(
        "req-2",
        "https://example.com/app.js",
        Initiator::Parent(RequestId::new("nav-1")),
        StateTag::PreConsent,
    ));
    builder.push_request(request(
        "req-3",
        "https://cdn.mystery.net/tag.js",
        Initiator::Unresolved,
        StateTag::PreConsent,
    ));
    builder.set_accessibility(AccessibilityResult::from_interactions(vec![]));
    builder.seal()
}

fn onetrust_match() -> ProviderMatch {
    ProviderMatch {
        provider_name: "OneTrust".into(),
        confidence: MatchConfidence::Confirmed,
        accept_selectors: vec!["onetrust-accept-btn-handler".into()],
        reject_selectors: vec!["onetrust-reject-all-handler".into()],
        cookie_name_patterns: vec!["OptanonConsent".into()],
    }
}

#[test]
fn report_carries_banner_states_and_chains() {
    let pre = pre_consent();
    let provider = onetrust_match();
    let snapshots = vec![pre];
    let input = ReportInput {
        target_url: "https://example.com",
        target_etld1: "example.com",
        provider: Some(&provider),
        snapshots: &snapshots,
        accept_action: None,
        reject_action: None,
        run_issues: &[],
    };
    let report = build_report(&input);

    assert_eq!(report["ccm_banner"]["banner_found"], true);
    assert_eq!(report["ccm_banner"]["provider_name"], "OneTrust");
    assert_eq!(
        report["preConsent"]["noThirdPartyCookiesPreConsent"]["value"],
        true
    );
    assert_eq!(
        report["preConsent"]["noThirdPartyCookiesPreConsent"]["outlook"],
        "Positive"
    );

    // Missing post-consent snapshots surface as not-evaluable, never false.
    assert_eq!(
        report["postConsentReject"]["consentRespected"]["value"],
        "notEvaluable"
    );

    let chains = &report["networkChains"]["preConsent"];
    assert_eq!(chains["nodes"].as_array().unwrap().len(), 4);
    let edges = chains["edges"].as_array().unwrap();
    assert!(edges
        .iter()
        .any(|e| e["parent"] == "nav-1" && e["child"] == "req-2"));
    assert!(edges
        .iter()
        .any(|e| e["parent"] == "unresolved" && e["child"] == "req-3"));
    assert!(chains["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["id"] == "unresolved" && n["type"] == "synthetic"));
}

#[test]
fn full_scenario_reports_consent_respected() {
    let pre = pre_consent();

    let mut accepted = SnapshotBuilder::open(StateTag::Accepted);
    accepted.push_cookie(cookie(
        "session",
        "example.com",
        CookieClass::FirstParty,
        StateTag::PreConsent,
    ));
    accepted.push_cookie(cookie(
        "_ga",
        "google-analytics.com",
        CookieClass::ThirdParty,
        StateTag::Accepted,
    ));
    let accepted = accepted.seal();

    let mut rejected = SnapshotBuilder::open(StateTag::Rejected);
    rejected.push_cookie(cookie(
        "session",
        "example.com",
        CookieClass::FirstParty,
        StateTag::PreConsent,
    ));
    let rejected = rejected.seal();

    let provider = onetrust_match();
    let snapshots = vec![pre, accepted, rejected];
    let accept_action = consentscope_core_types::ConsentActionOutcome::clicked(
        "onetrust-accept-btn-handler",
    );
    let reject_action = consentscope_core_types::ConsentActionOutcome::clicked(
        "onetrust-reject-all-handler",
    );
    let input = ReportInput {
        target_url: "https://example.com",
        target_etld1: "example.com",
        provider: Some(&provider),
        snapshots: &snapshots,
        accept_action: Some(&accept_action),
        reject_action: Some(&reject_action),
        run_issues: &[],
    };
    let report = build_report(&input);

    assert_eq!(report["postConsentReject"]["consentRespected"]["value"], true);
    assert_eq!(
        report["postConsentReject"]["consentRespected"]["outlook"],
        "Positive"
    );
    assert_eq!(report["postConsentAccept"]["newCookiesAfterAccept"]["value"], true);
    assert_eq!(report["postConsentReject"]["newCookiesAfterReject"]["value"], false);
    assert_eq!(report["summaries"]["postConsentAccept"]["thirdPartyCookies"], 1);
}

#[test]
fn classification_is_byte_identical_on_frozen_snapshots() {
    let pre = pre_consent();
    let provider = onetrust_match();
    let snapshots = vec![pre];
    let issues = vec![Issue::warning(StateTag::Accepted, "state skipped: no banner detected")];
    let input = ReportInput {
        target_url: "https://example.com",
        target_etld1: "example.com",
        provider: Some(&provider),
        snapshots: &snapshots,
        accept_action: None,
        reject_action: None,
        run_issues: &issues,
    };

    let first = serde_json::to_string(&build_report(&input)).unwrap();
    let second = serde_json::to_string(&build_report(&input)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn no_banner_report_keeps_pre_consent_flags() {
    let pre = pre_consent();
    let snapshots = vec![pre];
    let input = ReportInput {
        target_url: "https://example.com",
        target_etld1: "example.com",
        provider: None,
        snapshots: &snapshots,
        accept_action: None,
        reject_action: None,
        run_issues: &[],
    };
    let report = build_report(&input);

    assert_eq!(report["ccm_banner"]["banner_found"], false);
    assert_eq!(report["ccm_banner"]["provider_name"], "");
    assert_eq!(
        report["preConsent"]["noThirdPartyCookiesPreConsent"]["value"],
        true
    );
    assert_eq!(
        report["postConsentAccept"]["consentActionSucceeded"]["value"],
        "notEvaluable"
    );
}
