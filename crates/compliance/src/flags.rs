use std::collections::HashSet;

use consentscope_core_types::{
    ComplianceFlag, ConsentActionOutcome, CookieClass, CookieKey, Outlook, StateSnapshot, StateTag,
};
use provider_registry::ProviderMatch;

/// Frozen inputs the classifier reduces. All references; nothing here is
/// mutated, which is what makes repeated classification idempotent.
#[derive(Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub provider: Option<&'a ProviderMatch>,
    pub pre_consent: Option<&'a StateSnapshot>,
    pub accepted: Option<&'a StateSnapshot>,
    pub rejected: Option<&'a StateSnapshot>,
    pub accept_action: Option<&'a ConsentActionOutcome>,
    pub reject_action: Option<&'a ConsentActionOutcome>,
}

pub fn third_party_cookie_keys(snapshot: &StateSnapshot) -> HashSet<CookieKey> {
    snapshot
        .cookies
        .iter()
        .filter(|c| c.classification == CookieClass::ThirdParty)
        .map(|c| c.key())
        .collect()
}

fn cookie_keys(snapshot: &StateSnapshot) -> HashSet<CookieKey> {
    snapshot.cookies.iter().map(|c| c.key()).collect()
}

/// Flags for one report state. Each rule evaluates on its own; rule order
/// here only fixes presentation order.
pub fn state_flags(state: StateTag, input: &ClassifierInput<'_>) -> Vec<ComplianceFlag> {
    match state {
        StateTag::PreConsent => pre_consent_flags(input),
        StateTag::Accepted => accepted_flags(input),
        StateTag::Rejected => rejected_flags(input),
    }
}

fn pre_consent_flags(input: &ClassifierInput<'_>) -> Vec<ComplianceFlag> {
    let mut flags = Vec::new();

    const NO_3P_MEANING: &str = "no third-party cookies are set before any consent decision";
    match input.pre_consent {
        Some(pre) => flags.push(ComplianceFlag::evaluated(
            "noThirdPartyCookiesPreConsent",
            third_party_cookie_keys(pre).is_empty(),
            Outlook::Positive,
            NO_3P_MEANING,
        )),
        None => flags.push(ComplianceFlag::not_evaluable(
            "noThirdPartyCookiesPreConsent",
            "pre-consent snapshot missing",
            NO_3P_MEANING,
        )),
    }

    const WALL_MEANING: &str = "the page cannot be used until the consent banner is answered";
    match input.pre_consent.and_then(|pre| pre.accessibility.as_ref()) {
        Some(access) => flags.push(ComplianceFlag::evaluated(
            "pageNotInteractable",
            access.page_not_interactable,
            Outlook::Negative,
            WALL_MEANING,
        )),
        None => flags.push(ComplianceFlag::not_evaluable(
            "pageNotInteractable",
            "accessibility probe did not run",
            WALL_MEANING,
        )),
    }

    const ANALYTICS_MEANING: &str = "an analytics container loads before any consent decision";
    match input.pre_consent {
        Some(pre) => flags.push(ComplianceFlag::evaluated(
            "analyticsBeforeConsent",
            pre.requests.iter().any(|r| r.analytics),
            Outlook::Negative,
            ANALYTICS_MEANING,
        )),
        None => flags.push(ComplianceFlag::not_evaluable(
            "analyticsBeforeConsent",
            "pre-consent snapshot missing",
            ANALYTICS_MEANING,
        )),
    }

    flags
}

fn accepted_flags(input: &ClassifierInput<'_>) -> Vec<ComplianceFlag> {
    let mut flags = Vec::new();

    const ACTION_MEANING: &str = "the accept action was clicked successfully";
    match input.accept_action {
        Some(action) => flags.push(ComplianceFlag::evaluated(
            "consentActionSucceeded",
            action.successful,
            Outlook::Positive,
            ACTION_MEANING,
        )),
        None => flags.push(ComplianceFlag::not_evaluable(
            "consentActionSucceeded",
            "accept action not attempted",
            ACTION_MEANING,
        )),
    }

    const NEW_COOKIES_MEANING: &str = "cookies appeared after accepting that were absent pre-consent";
    match (input.pre_consent, input.accepted) {
        (Some(pre), Some(accepted)) => {
            let baseline = cookie_keys(pre);
            let appeared = accepted
                .cookies
                .iter()
                .any(|c| !baseline.contains(&c.key()));
            flags.push(ComplianceFlag::evaluated(
                "newCookiesAfterAccept",
                appeared,
                Outlook::Neutral,
                NEW_COOKIES_MEANING,
            ));
        }
        _ => flags.push(ComplianceFlag::not_evaluable(
            "newCookiesAfterAccept",
            missing_state_cause(input.pre_consent.is_some(), input.accepted.is_some(), "accepted"),
            NEW_COOKIES_MEANING,
        )),
    }

    flags
}

fn rejected_flags(input: &ClassifierInput<'_>) -> Vec<ComplianceFlag> {
    let mut flags = Vec::new();

    const ACTION_MEANING: &str = "the reject action was clicked successfully";
    match input.reject_action {
        Some(action) => flags.push(ComplianceFlag::evaluated(
            "consentActionSucceeded",
            action.successful,
            Outlook::Positive,
            ACTION_MEANING,
        )),
        None => flags.push(ComplianceFlag::not_evaluable(
            "consentActionSucceeded",
            "reject action not attempted",
            ACTION_MEANING,
        )),
    }

    const NEW_COOKIES_MEANING: &str = "cookies appeared after rejecting that were absent pre-consent";
    match (input.pre_consent, input.rejected) {
        (Some(pre), Some(rejected)) => {
            let baseline = cookie_keys(pre);
            let appeared = rejected
                .cookies
                .iter()
                .any(|c| !baseline.contains(&c.key()));
            flags.push(ComplianceFlag::evaluated(
                "newCookiesAfterReject",
                appeared,
                Outlook::Negative,
                NEW_COOKIES_MEANING,
            ));
        }
        _ => flags.push(ComplianceFlag::not_evaluable(
            "newCookiesAfterReject",
            missing_state_cause(input.pre_consent.is_some(), input.rejected.is_some(), "rejected"),
            NEW_COOKIES_MEANING,
        )),
    }

    const RESPECT_MEANING: &str =
        "accepting consent yields strictly more third-party cookies than rejecting it";
    match (input.accepted, input.rejected) {
        (Some(accepted), Some(rejected)) => {
            let accepted_set = third_party_cookie_keys(accepted);
            let rejected_set = third_party_cookie_keys(rejected);
            let respected =
                rejected_set.is_subset(&accepted_set) && accepted_set.len() > rejected_set.len();
            flags.push(ComplianceFlag::evaluated(
                "consentRespected",
                respected,
                Outlook::Positive,
                RESPECT_MEANING,
            ));
        }
        (accepted, rejected) => {
            let cause = match (accepted, rejected) {
                (None, None) => "accepted and rejected snapshots missing",
                (None, Some(_)) => "accepted snapshot missing",
                (Some(_), None) => "rejected snapshot missing",
                _ => unreachable!(),
            };
            flags.push(ComplianceFlag::not_evaluable(
                "consentRespected",
                cause,
                RESPECT_MEANING,
            ));
        }
    }

    flags
}

fn missing_state_cause(have_pre: bool, have_state: bool, state_name: &str) -> String {
    match (have_pre, have_state) {
        (false, false) => format!("pre-consent and {state_name} snapshots missing"),
        (false, true) => "pre-consent snapshot missing".to_string(),
        (true, false) => format!("{state_name} snapshot missing"),
        (true, true) => unreachable!("cause requested with both snapshots present"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentscope_core_types::{
        AccessibilityResult, CookieRecord, FlagValue, SameSiteMode, SnapshotBuilder,
    };

    fn cookie(name: &str, domain: &str, class: CookieClass, state: StateTag) -> CookieRecord {
        CookieRecord {
            name: name.into(),
            domain: domain.into(),
            value_len: 3,
            secure: false,
            http_only: false,
            same_site: SameSiteMode::Lax,
            classification: class,
            first_seen: state,
        }
    }

    fn snapshot(state: StateTag, cookies: Vec<CookieRecord>) -> StateSnapshot {
        let mut builder = SnapshotBuilder::open(state);
        for c in cookies {
            builder.push_cookie(c);
        }
        if state == StateTag::PreConsent {
            builder.set_accessibility(AccessibilityResult::from_interactions(vec![]));
        }
        builder.seal()
    }

    fn bool_value(flags: &[ComplianceFlag], id: &str) -> Option<bool> {
        flags.iter().find(|f| f.id == id).and_then(|f| match f.value {
            FlagValue::Bool(b) => Some(b),
            _ => None,
        })
    }

    #[test]
    fn clean_pre_consent_is_positive() {
        let pre = snapshot(
            StateTag::PreConsent,
            vec![cookie("session", "example.com", CookieClass::FirstParty, StateTag::PreConsent)],
        );
        let input = ClassifierInput {
            provider: None,
            pre_consent: Some(&pre),
            accepted: None,
            rejected: None,
            accept_action: None,
            reject_action: None,
        };
        let flags = state_flags(StateTag::PreConsent, &input);
        assert_eq!(bool_value(&flags, "noThirdPartyCookiesPreConsent"), Some(true));
    }

    #[test]
    fn consent_respected_requires_proper_superset() {
        let pre = snapshot(StateTag::PreConsent, vec![]);
        let accepted = snapshot(
            StateTag::Accepted,
            vec![cookie("_ga", "google-analytics.com", CookieClass::ThirdParty, StateTag::Accepted)],
        );
        let rejected_clean = snapshot(StateTag::Rejected, vec![]);
        let input = ClassifierInput {
            provider: None,
            pre_consent: Some(&pre),
            accepted: Some(&accepted),
            rejected: Some(&rejected_clean),
            accept_action: None,
            reject_action: None,
        };
        let flags = state_flags(StateTag::Rejected, &input);
        assert_eq!(bool_value(&flags, "consentRespected"), Some(true));

        // Identical sets are not a proper superset.
        let rejected_same = snapshot(
            StateTag::Rejected,
            vec![cookie("_ga", "google-analytics.com", CookieClass::ThirdParty, StateTag::Rejected)],
        );
        let input = ClassifierInput {
            rejected: Some(&rejected_same),
            ..input
        };
        let flags = state_flags(StateTag::Rejected, &input);
        assert_eq!(bool_value(&flags, "consentRespected"), Some(false));
    }

    #[test]
    fn missing_snapshots_are_not_evaluable_not_false() {
        let input = ClassifierInput {
            provider: None,
            pre_consent: None,
            accepted: None,
            rejected: None,
            accept_action: None,
            reject_action: None,
        };
        let flags = state_flags(StateTag::Rejected, &input);
        let respected = flags.iter().find(|f| f.id == "consentRespected").unwrap();
        assert!(matches!(respected.value, FlagValue::NotEvaluable(_)));
    }

    #[test]
    fn rules_are_order_insensitive_and_repeatable() {
        let pre = snapshot(
            StateTag::PreConsent,
            vec![cookie("_fbp", "facebook.com", CookieClass::ThirdParty, StateTag::PreConsent)],
        );
        let input = ClassifierInput {
            provider: None,
            pre_consent: Some(&pre),
            accepted: None,
            rejected: None,
            accept_action: None,
            reject_action: None,
        };
        let first = state_flags(StateTag::PreConsent, &input);
        let second = state_flags(StateTag::PreConsent, &input);
        assert_eq!(first, second);
        assert_eq!(bool_value(&first, "noThirdPartyCookiesPreConsent"), Some(false));
    }
}
