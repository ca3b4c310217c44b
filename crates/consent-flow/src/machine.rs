use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use access_probe::AccessibilityProbe;
use browser_adapter::{scripts, AdapterError, BrowserAdapter, RawCookie};
use consentscope_core_types::{
    domain, ConsentActionOutcome, CookieKey, Issue, RunId, SnapshotBuilder, StateSnapshot,
    StateTag,
};
use network_capture::{CaptureWindow, CookieResolver};
use provider_registry::{ProviderMatch, ProviderRegistry};

use crate::banner::detect_banner;
use crate::config::FlowConfig;
use crate::guard::SessionGuard;
use crate::session::Session;

struct PreConsentOutcome {
    snapshot: StateSnapshot,
    provider: Option<ProviderMatch>,
    baseline: HashMap<CookieKey, StateTag>,
    nav_failed: bool,
}

struct SubRunOutcome {
    snapshot: StateSnapshot,
    action: ConsentActionOutcome,
}

/// Drives one target through the consent states and returns the completed
/// [`Session`]. Failures surface as issues on the affected state; the run
/// always completes with whatever snapshots were sealed.
pub struct ConsentStateMachine {
    adapter: Arc<dyn BrowserAdapter>,
    registry: Arc<ProviderRegistry>,
    config: FlowConfig,
}

impl ConsentStateMachine {
    pub fn new(
        adapter: Arc<dyn BrowserAdapter>,
        registry: Arc<ProviderRegistry>,
        config: FlowConfig,
    ) -> Self {
        Self {
            adapter,
            registry,
            config,
        }
    }

    pub async fn run(&self, target_url: &str) -> Session {
        self.run_cancellable(target_url, CancellationToken::new())
            .await
    }

    pub async fn run_cancellable(&self, target_url: &str, cancel: CancellationToken) -> Session {
        let run_id = RunId::new();
        info!(run = %run_id.0, target = target_url, "consent analysis run starting");

        let target_etld1 = match domain::registrable_domain(target_url) {
            Ok(domain) => domain,
            Err(err) => {
                // Nothing to analyze without a target identity.
                return Session {
                    run_id,
                    target_url: target_url.to_string(),
                    target_etld1: String::new(),
                    snapshots: Vec::new(),
                    provider: None,
                    accept_action: None,
                    reject_action: None,
                    issues: vec![Issue::fatal(
                        StateTag::PreConsent,
                        format!("invalid target url: {err}"),
                    )],
                };
            }
        };

        let pre = self
            .pre_consent(target_url, &target_etld1, &cancel)
            .await;

        let mut session = Session {
            run_id,
            target_url: target_url.to_string(),
            target_etld1: target_etld1.clone(),
            snapshots: vec![pre.snapshot],
            provider: pre.provider.clone(),
            accept_action: None,
            reject_action: None,
            issues: Vec::new(),
        };

        if pre.nav_failed {
            for state in [StateTag::Accepted, StateTag::Rejected] {
                session.issues.push(Issue::fatal(
                    state,
                    "state not reached: initial navigation failed",
                ));
            }
            return session;
        }

        match &pre.provider {
            None => {
                for state in [StateTag::Accepted, StateTag::Rejected] {
                    session
                        .issues
                        .push(Issue::warning(state, "state skipped: no banner detected"));
                }
            }
            Some(provider) => {
                let (accept, reject) = if self.config.parallel_subruns {
                    tokio::join!(
                        self.sub_run(StateTag::Accepted, target_url, &target_etld1, provider, &pre.baseline, &cancel),
                        self.sub_run(StateTag::Rejected, target_url, &target_etld1, provider, &pre.baseline, &cancel),
                    )
                } else {
                    let accept = self
                        .sub_run(StateTag::Accepted, target_url, &target_etld1, provider, &pre.baseline, &cancel)
                        .await;
                    let reject = self
                        .sub_run(StateTag::Rejected, target_url, &target_etld1, provider, &pre.baseline, &cancel)
                        .await;
                    (accept, reject)
                };
                session.accept_action = Some(accept.action);
                session.snapshots.push(accept.snapshot);
                session.reject_action = Some(reject.action);
                session.snapshots.push(reject.snapshot);
            }
        }

        info!(
            run = %run_id.0,
            snapshots = session.snapshots.len(),
            banner = session.banner_found(),
            "consent analysis run complete"
        );
        session
    }

    async fn pre_consent(
        &self,
        target_url: &str,
        target_etld1: &str,
        cancel: &CancellationToken,
    ) -> PreConsentOutcome {
        let mut builder = SnapshotBuilder::open(StateTag::PreConsent);

        let guard = match SessionGuard::acquire(Arc::clone(&self.adapter)).await {
            Ok(guard) => guard,
            Err(err) => {
                builder.push_issue(Issue::fatal(
                    StateTag::PreConsent,
                    format!("browser session unavailable: {err}"),
                ));
                return PreConsentOutcome {
                    snapshot: builder.seal(),
                    provider: None,
                    baseline: HashMap::new(),
                    nav_failed: true,
                };
            }
        };

        if let Err(err) = self
            .adapter
            .navigate(guard.handle(), target_url, self.config.nav_timeout())
            .await
        {
            builder.push_issue(Issue::fatal(
                StateTag::PreConsent,
                format!("navigation failed: {err}"),
            ));
            guard.release().await;
            return PreConsentOutcome {
                snapshot: builder.seal(),
                provider: None,
                baseline: HashMap::new(),
                nav_failed: true,
            };
        }

        self.wait_page_ready(&guard, &mut builder, cancel).await;
        let window = self.open_window(&guard, &mut builder, StateTag::PreConsent).await;

        let access = AccessibilityProbe::run(self.adapter.as_ref(), guard.handle()).await;
        if !access.can_scroll {
            builder.push_issue(Issue::warning(
                StateTag::PreConsent,
                "page scrolling is blocked",
            ));
        }
        builder.set_accessibility(access);

        let provider = match detect_banner(
            self.adapter.as_ref(),
            guard.handle(),
            &self.registry,
            &self.config,
            cancel,
        )
        .await
        {
            Ok(provider) => provider,
            Err(err) => {
                builder.push_issue(Issue::warning(
                    StateTag::PreConsent,
                    format!("banner detection failed: {err}"),
                ));
                None
            }
        };
        if provider.is_none() {
            builder.push_issue(Issue::warning(StateTag::PreConsent, "no banner detected"));
        }

        self.settle(cancel).await;

        let jar = self.jar(&guard, &mut builder, StateTag::PreConsent).await;
        let resolver = self.resolver(target_etld1, provider.as_ref());
        self.close_window(window, &resolver, &jar, &HashMap::new(), &mut builder)
            .await;

        guard.release().await;
        let snapshot = builder.seal();
        let baseline = snapshot
            .cookies
            .iter()
            .map(|c| (c.key(), c.first_seen))
            .collect();
        PreConsentOutcome {
            snapshot,
            provider,
            baseline,
            nav_failed: false,
        }
    }

    async fn sub_run(
        &self,
        state: StateTag,
        target_url: &str,
        target_etld1: &str,
        provider: &ProviderMatch,
        baseline: &HashMap<CookieKey, StateTag>,
        cancel: &CancellationToken,
    ) -> SubRunOutcome {
        debug!(%state, "sub-run starting with fresh isolated session");
        let mut builder = SnapshotBuilder::open(state);
        let mut action = ConsentActionOutcome::not_performed();

        let guard = match SessionGuard::acquire(Arc::clone(&self.adapter)).await {
            Ok(guard) => guard,
            Err(err) => {
                builder.push_issue(Issue::fatal(
                    state,
                    format!("browser session unavailable: {err}"),
                ));
                return SubRunOutcome {
                    snapshot: builder.seal(),
                    action,
                };
            }
        };

        if let Err(err) = self
            .adapter
            .navigate(guard.handle(), target_url, self.config.nav_timeout())
            .await
        {
            builder.push_issue(Issue::fatal(state, format!("navigation failed: {err}")));
            guard.release().await;
            return SubRunOutcome {
                snapshot: builder.seal(),
                action,
            };
        }

        self.wait_page_ready(&guard, &mut builder, cancel).await;
        let window = self.open_window(&guard, &mut builder, state).await;

        // The fresh session shows the banner again; re-detect before acting.
        let redetected = match detect_banner(
            self.adapter.as_ref(),
            guard.handle(),
            &self.registry,
            &self.config,
            cancel,
        )
        .await
        {
            Ok(matched) => matched,
            Err(err) => {
                builder.push_issue(Issue::warning(
                    state,
                    format!("banner detection failed: {err}"),
                ));
                None
            }
        };

        match redetected {
            None => {
                builder.push_issue(Issue::warning(
                    state,
                    "banner not re-detected; consent action skipped",
                ));
            }
            Some(matched) => {
                let selectors = match state {
                    StateTag::Accepted => &matched.accept_selectors,
                    _ => &matched.reject_selectors,
                };
                action = self
                    .click_consent(&guard, selectors, state, &mut builder)
                    .await;
            }
        }

        self.settle(cancel).await;

        let jar = self.jar(&guard, &mut builder, state).await;
        let resolver = self.resolver(target_etld1, Some(provider));
        self.close_window(window, &resolver, &jar, baseline, &mut builder)
            .await;

        guard.release().await;
        SubRunOutcome {
            snapshot: builder.seal(),
            action,
        }
    }

    async fn click_consent(
        &self,
        guard: &SessionGuard,
        selectors: &[String],
        state: StateTag,
        builder: &mut SnapshotBuilder,
    ) -> ConsentActionOutcome {
        let button_wait = std::time::Duration::from_millis(self.config.banner_poll_max_ms);
        for selector in selectors {
            // Selector priority order: the first one that materializes wins.
            if self
                .adapter
                .wait_for_selector(guard.handle(), selector, button_wait)
                .await
                .is_err()
            {
                continue;
            }
            match self.adapter.click(guard.handle(), selector).await {
                Ok(()) => {
                    debug!(%state, selector = %selector, "consent action clicked");
                    return ConsentActionOutcome::clicked(selector.clone());
                }
                Err(AdapterError::SelectorNotFound(_)) => continue,
                Err(err) => {
                    builder.push_issue(Issue::warning(
                        state,
                        format!("consent click on '{selector}' failed: {err}"),
                    ));
                    return ConsentActionOutcome {
                        performed: true,
                        successful: false,
                        button_found: true,
                        selector: Some(selector.clone()),
                    };
                }
            }
        }
        builder.push_issue(Issue::warning(
            state,
            format!("no visible consent action button found for {state}"),
        ));
        ConsentActionOutcome::button_missing()
    }

    async fn wait_page_ready(
        &self,
        guard: &SessionGuard,
        builder: &mut SnapshotBuilder,
        cancel: &CancellationToken,
    ) {
        let deadline = tokio::time::Instant::now() + self.config.page_ready_timeout();
        loop {
            match self
                .adapter
                .execute_script(guard.handle(), scripts::PAGE_READY)
                .await
            {
                Ok(value) if value.as_bool().unwrap_or(false) => return,
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "page-ready poll failed");
                }
            }
            if tokio::time::Instant::now() >= deadline {
                builder.push_issue(Issue::warning(
                    builder.state(),
                    "page-ready wait timed out",
                ));
                return;
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
            }
        }
    }

    async fn open_window(
        &self,
        guard: &SessionGuard,
        builder: &mut SnapshotBuilder,
        state: StateTag,
    ) -> Option<CaptureWindow> {
        match self.adapter.subscribe_network_events(guard.handle()).await {
            Ok(events) => Some(CaptureWindow::open(state, events)),
            Err(err) => {
                builder.push_issue(Issue::warning(
                    state,
                    format!("capture incomplete: event stream unavailable: {err}"),
                ));
                None
            }
        }
    }

    async fn close_window(
        &self,
        window: Option<CaptureWindow>,
        resolver: &CookieResolver,
        jar: &[RawCookie],
        baseline: &HashMap<CookieKey, StateTag>,
        builder: &mut SnapshotBuilder,
    ) {
        match window {
            Some(window) => {
                let outcome = window.close(resolver, jar, baseline).await;
                for cookie in outcome.cookies {
                    builder.push_cookie(cookie);
                }
                for request in outcome.requests {
                    builder.push_request(request);
                }
                for issue in outcome.issues {
                    builder.push_issue(issue);
                }
            }
            None => {
                // No event stream; the jar sweep is all we have.
                for raw in jar {
                    let first_seen = baseline
                        .get(&CookieKey::new(raw.name.clone(), raw.domain.clone()))
                        .copied()
                        .unwrap_or(builder.state());
                    builder.push_cookie(resolver.record(raw, first_seen));
                }
            }
        }
    }

    async fn jar(
        &self,
        guard: &SessionGuard,
        builder: &mut SnapshotBuilder,
        state: StateTag,
    ) -> Vec<RawCookie> {
        match self.adapter.get_cookies(guard.handle()).await {
            Ok(jar) => jar,
            Err(err) => {
                builder.push_issue(Issue::warning(
                    state,
                    format!("cookie jar read failed: {err}"),
                ));
                Vec::new()
            }
        }
    }

    fn resolver(&self, target_etld1: &str, provider: Option<&ProviderMatch>) -> CookieResolver {
        CookieResolver::new(
            target_etld1,
            provider
                .map(|p| p.cookie_name_patterns.clone())
                .unwrap_or_default(),
        )
    }

    async fn settle(&self, cancel: &CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(self.config.settle()) => {}
        }
    }
}
