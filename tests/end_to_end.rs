//! End-to-end scenarios against the scripted browser backend.

use std::sync::Arc;

use browser_adapter::{
    BrowserAdapter, ClickEffect, PageScript, RawCookie, ScriptedAdapter, ScriptedRequest,
};
use consentscope::core_types::SameSiteMode;
use consentscope::{report_for, Engine, EngineConfig, FlowConfig};

const URL: &str = "https://example.com";

fn fast_config() -> EngineConfig {
    EngineConfig {
        flow: FlowConfig::fast(),
        catalog_path: None,
    }
}

/// Target sets one first-party cookie on load; OneTrust banner present;
/// accepting adds one third-party cookie, rejecting adds nothing.
fn onetrust_site() -> PageScript {
    PageScript::default()
        .with_text("<html>cookie consent managed by OneTrust</html>")
        .with_element("onetrust-banner-sdk")
        .with_element("onetrust-accept-btn-handler")
        .with_element("onetrust-reject-all-handler")
        .sets_cookie_on_load(
            RawCookie::new("session", "abc", "example.com")
                .secure()
                .http_only()
                .same_site(SameSiteMode::Lax),
        )
        .emits_request_on_load(ScriptedRequest::new("nav-1", "https://example.com/"))
        .on_click(
            "onetrust-accept-btn-handler",
            ClickEffect::default()
                .sets_cookie(RawCookie::new("_ga", "xyz", ".google-analytics.com"))
                .emits_request(
                    ScriptedRequest::new("req-ga", "https://www.google-analytics.com/analytics.js")
                        .initiated_by("nav-1"),
                )
                .removes_element("onetrust-banner-sdk"),
        )
        .on_click(
            "onetrust-reject-all-handler",
            ClickEffect::default().removes_element("onetrust-banner-sdk"),
        )
}

fn engine(adapter: &Arc<ScriptedAdapter>) -> Engine {
    Engine::new(Arc::clone(adapter) as Arc<dyn BrowserAdapter>, fast_config()).unwrap()
}

#[tokio::test]
async fn onetrust_accept_reject_scenario() {
    let adapter = Arc::new(ScriptedAdapter::single_page(URL, onetrust_site()));
    let analysis = engine(&adapter).analyze(URL).await;
    let report = &analysis.report;

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

    assert_eq!(report["postConsentReject"]["consentRespected"]["value"], true);
    assert_eq!(
        report["postConsentReject"]["consentRespected"]["outlook"],
        "Positive"
    );

    assert_eq!(report["preConsent"]["pageNotInteractable"]["value"], false);
    assert_eq!(report["preConsent"]["analyticsBeforeConsent"]["value"], false);

    // No orphaned browser sessions after the run.
    assert_eq!(adapter.open_session_count(), 0);
}

#[tokio::test]
async fn no_banner_scenario() {
    let page = PageScript::default()
        .with_text("<html>nothing to consent to here</html>")
        .sets_cookie_on_load(RawCookie::new("session", "abc", "example.com"));
    let adapter = Arc::new(ScriptedAdapter::single_page(URL, page));
    let analysis = engine(&adapter).analyze(URL).await;
    let report = &analysis.report;

    assert_eq!(report["ccm_banner"]["banner_found"], false);

    // Pre-consent flags still fully computed.
    assert_eq!(
        report["preConsent"]["noThirdPartyCookiesPreConsent"]["value"],
        true
    );

    // Post-consent states are present but not evaluable.
    assert_eq!(
        report["postConsentAccept"]["consentActionSucceeded"]["value"],
        "notEvaluable"
    );
    assert_eq!(
        report["postConsentReject"]["consentRespected"]["value"],
        "notEvaluable"
    );

    let issues = report["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|i| i["message"] == "no banner detected" && i["state"] == "preConsent"));
}

#[tokio::test]
async fn analytics_before_consent_is_flagged() {
    let page = onetrust_site().emits_request_on_load(
        ScriptedRequest::new("req-gtm", "https://www.googletagmanager.com/gtm.js")
            .initiated_by("nav-1"),
    );
    let adapter = Arc::new(ScriptedAdapter::single_page(URL, page));
    let analysis = engine(&adapter).analyze(URL).await;

    assert_eq!(
        analysis.report["preConsent"]["analyticsBeforeConsent"]["value"],
        true
    );
    assert_eq!(
        analysis.report["preConsent"]["analyticsBeforeConsent"]["outlook"],
        "Negative"
    );
}

#[tokio::test]
async fn report_is_idempotent_over_a_frozen_session() {
    let adapter = Arc::new(ScriptedAdapter::single_page(URL, onetrust_site()));
    let analysis = engine(&adapter).analyze(URL).await;

    let first = serde_json::to_string(&report_for(&analysis.session)).unwrap();
    let second = serde_json::to_string(&report_for(&analysis.session)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, serde_json::to_string(&analysis.report).unwrap());
}

#[tokio::test]
async fn custom_catalog_file_drives_detection() {
    let catalog = r#"
version: 1
providers:
  - provider: Cookiebot
    banner_ids: [CybotCookiebotDialog]
    accept_ids: [CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll]
    reject_ids: [CybotCookiebotDialogBodyButtonDecline]
"#;
    use std::io::Write;
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(catalog.as_bytes()).unwrap();

    let page = PageScript::default()
        .with_text("<html>consent by Cookiebot</html>")
        .with_element("CybotCookiebotDialog")
        .with_element("CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll")
        .with_element("CybotCookiebotDialogBodyButtonDecline");
    let adapter = Arc::new(ScriptedAdapter::single_page(URL, page));

    let config = EngineConfig {
        flow: FlowConfig::fast(),
        catalog_path: Some(file.path().to_path_buf()),
    };
    let engine = Engine::new(Arc::clone(&adapter) as Arc<dyn BrowserAdapter>, config).unwrap();
    let analysis = engine.analyze(URL).await;

    assert_eq!(analysis.report["ccm_banner"]["provider_name"], "Cookiebot");
}
