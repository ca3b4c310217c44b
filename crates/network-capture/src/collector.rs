use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use browser_adapter::{NetworkEvent, RawCookie, RequestEvent};
use consentscope_core_types::{
    CookieKey, CookieRecord, Issue, NetworkRequest, StateTag,
};

use crate::classify::CookieResolver;
use crate::forest::resolve_requests;

/// Resolved output of one capture window.
#[derive(Clone, Debug)]
pub struct CaptureOutcome {
    pub cookies: Vec<CookieRecord>,
    pub requests: Vec<NetworkRequest>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Default)]
struct IngestBuffer {
    events: Vec<NetworkEvent>,
    stream_closed_early: bool,
}

/// One open capture window for one consent state.
///
/// Ingestion runs as its own task consuming the adapter's stream, so capture
/// never blocks page load and never polls. `close` stops ingestion, drains
/// the queue, and resolves the buffer.
pub struct CaptureWindow {
    state: StateTag,
    cancel: CancellationToken,
    task: JoinHandle<IngestBuffer>,
}

impl CaptureWindow {
    pub fn open(state: StateTag, mut events: mpsc::Receiver<NetworkEvent>) -> Self {
        let cancel = CancellationToken::new();
        let loop_token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut buffer = IngestBuffer::default();
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    maybe = events.recv() => match maybe {
                        Some(event) => buffer.events.push(event),
                        None => {
                            buffer.stream_closed_early = true;
                            break;
                        }
                    }
                }
            }
            // Whatever was already queued when the window closed still
            // belongs to this state.
            while let Ok(event) = events.try_recv() {
                buffer.events.push(event);
            }
            buffer
        });
        Self {
            state,
            cancel,
            task,
        }
    }

    pub fn state(&self) -> StateTag {
        self.state
    }

    /// Closes the window and resolves buffered events into ordered records.
    ///
    /// `final_jar` is the driver's cookie jar at window close; cookies the
    /// event stream missed are appended after the evented ones so nothing
    /// set during the window is lost. `baseline` maps cookies attributed to
    /// an earlier state to the state that first saw them.
    pub async fn close(
        self,
        resolver: &CookieResolver,
        final_jar: &[RawCookie],
        baseline: &HashMap<CookieKey, StateTag>,
    ) -> CaptureOutcome {
        self.cancel.cancel();
        let state = self.state;
        let buffer = match self.task.await {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!(%state, error = %err, "capture ingestion task failed");
                let mut outcome = CaptureOutcome {
                    cookies: Vec::new(),
                    requests: Vec::new(),
                    issues: vec![Issue::warning(
                        state,
                        format!("capture incomplete: ingestion task failed: {err}"),
                    )],
                };
                append_jar_sweep(&mut outcome.cookies, resolver, final_jar, baseline, state);
                return outcome;
            }
        };

        let mut issues = Vec::new();
        if buffer.stream_closed_early {
            issues.push(Issue::warning(
                state,
                "capture incomplete: event stream closed before window end",
            ));
        }

        let mut cookies: Vec<CookieRecord> = Vec::new();
        let mut seen: HashSet<CookieKey> = HashSet::new();
        let mut request_events: Vec<RequestEvent> = Vec::new();

        for event in &buffer.events {
            match event {
                NetworkEvent::CookieSet(raw) => {
                    let key = CookieKey::new(raw.name.clone(), raw.domain.clone());
                    // First observation wins the position; later sets of the
                    // same cookie do not reorder the sequence.
                    if seen.insert(key.clone()) {
                        let first_seen = baseline.get(&key).copied().unwrap_or(state);
                        cookies.push(resolver.record(raw, first_seen));
                    }
                }
                NetworkEvent::Request(request) => request_events.push(request.clone()),
            }
        }

        let mut outcome = CaptureOutcome {
            cookies,
            requests: resolve_requests(&request_events, state),
            issues,
        };
        append_jar_sweep_deduped(&mut outcome.cookies, &mut seen, resolver, final_jar, baseline, state);

        debug!(
            %state,
            cookies = outcome.cookies.len(),
            requests = outcome.requests.len(),
            "capture window resolved"
        );
        outcome
    }
}

fn append_jar_sweep(
    cookies: &mut Vec<CookieRecord>,
    resolver: &CookieResolver,
    final_jar: &[RawCookie],
    baseline: &HashMap<CookieKey, StateTag>,
    state: StateTag,
) {
    let mut seen: HashSet<CookieKey> = cookies.iter().map(|c| c.key()).collect();
    append_jar_sweep_deduped(cookies, &mut seen, resolver, final_jar, baseline, state);
}

fn append_jar_sweep_deduped(
    cookies: &mut Vec<CookieRecord>,
    seen: &mut HashSet<CookieKey>,
    resolver: &CookieResolver,
    final_jar: &[RawCookie],
    baseline: &HashMap<CookieKey, StateTag>,
    state: StateTag,
) {
    for raw in final_jar {
        let key = CookieKey::new(raw.name.clone(), raw.domain.clone());
        if seen.insert(key.clone()) {
            let first_seen = baseline.get(&key).copied().unwrap_or(state);
            cookies.push(resolver.record(raw, first_seen));
        }
    }
}
