//! Deterministic in-memory [`BrowserAdapter`] backend.
//!
//! Pages are scripted up front: what the DOM contains, which cookies and
//! requests the load produces, and what each click does. Sessions are fully
//! isolated (own jar, own event buffer), which is exactly the property the
//! engine's sub-run isolation tests need to observe.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use consentscope_core_types::ResourceType;

use crate::adapter::{AdapterError, BrowserAdapter, SessionHandle};
use crate::events::{NetworkEvent, RawCookie, RequestEvent};
use crate::scripts;

/// One request a scripted page emits.
#[derive(Clone, Debug)]
pub struct ScriptedRequest {
    pub id: String,
    pub url: String,
    pub resource_type: ResourceType,
    pub initiator: Option<String>,
}

impl ScriptedRequest {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            resource_type: ResourceType::Other,
            initiator: None,
        }
    }

    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = resource_type;
        self
    }

    pub fn initiated_by(mut self, parent: impl Into<String>) -> Self {
        self.initiator = Some(parent.into());
        self
    }
}

/// What clicking a selector does to the scripted page.
#[derive(Clone, Debug, Default)]
pub struct ClickEffect {
    pub cookies: Vec<RawCookie>,
    pub requests: Vec<ScriptedRequest>,
    pub removes_elements: Vec<String>,
}

impl ClickEffect {
    pub fn sets_cookie(mut self, cookie: RawCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn emits_request(mut self, request: ScriptedRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn removes_element(mut self, id: impl Into<String>) -> Self {
        self.removes_elements.push(id.into());
        self
    }
}

/// Scripted behaviour of one URL.
#[derive(Clone, Debug)]
pub struct PageScript {
    pub element_ids: Vec<String>,
    pub page_text: String,
    pub cookies_on_load: Vec<RawCookie>,
    pub requests_on_load: Vec<ScriptedRequest>,
    pub click_effects: HashMap<String, ClickEffect>,
    pub scroll_succeeds: bool,
    pub neutral_click_succeeds: bool,
    pub fail_navigation: bool,
}

impl Default for PageScript {
    fn default() -> Self {
        Self {
            element_ids: Vec::new(),
            page_text: String::new(),
            cookies_on_load: Vec::new(),
            requests_on_load: Vec::new(),
            click_effects: HashMap::new(),
            scroll_succeeds: true,
            neutral_click_succeeds: true,
            fail_navigation: false,
        }
    }
}

impl PageScript {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.page_text = text.into();
        self
    }

    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.element_ids.push(id.into());
        self
    }

    pub fn sets_cookie_on_load(mut self, cookie: RawCookie) -> Self {
        self.cookies_on_load.push(cookie);
        self
    }

    pub fn emits_request_on_load(mut self, request: ScriptedRequest) -> Self {
        self.requests_on_load.push(request);
        self
    }

    pub fn on_click(mut self, selector: impl Into<String>, effect: ClickEffect) -> Self {
        self.click_effects.insert(selector.into(), effect);
        self
    }

    pub fn blocks_scroll(mut self) -> Self {
        self.scroll_succeeds = false;
        self
    }

    pub fn blocks_clicks(mut self) -> Self {
        self.neutral_click_succeeds = false;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.fail_navigation = true;
        self
    }
}

#[derive(Debug, Default)]
struct SessionState {
    current_url: Option<String>,
    jar: Vec<RawCookie>,
    removed: HashSet<String>,
    buffer: Vec<NetworkEvent>,
    subscribers: Vec<mpsc::Sender<NetworkEvent>>,
}

impl SessionState {
    fn set_cookie(&mut self, cookie: RawCookie) {
        // Same name+domain overwrites in place; arrival position is kept.
        if let Some(existing) = self
            .jar
            .iter_mut()
            .find(|c| c.name == cookie.name && c.domain == cookie.domain)
        {
            *existing = cookie;
        } else {
            self.jar.push(cookie);
        }
    }

    fn emit(&mut self, event: NetworkEvent) {
        self.buffer.push(event.clone());
        self.subscribers
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    fn element_present(&self, id: &str) -> bool {
        self.current_url.is_some() && !self.removed.contains(id)
    }
}

/// In-memory scripted browser.
pub struct ScriptedAdapter {
    pages: HashMap<String, PageScript>,
    sessions: DashMap<Uuid, Mutex<SessionState>>,
}

impl ScriptedAdapter {
    pub fn new(pages: HashMap<String, PageScript>) -> Self {
        Self {
            pages,
            sessions: DashMap::new(),
        }
    }

    pub fn single_page(url: impl Into<String>, page: PageScript) -> Self {
        let mut pages = HashMap::new();
        pages.insert(url.into(), page);
        Self::new(pages)
    }

    pub fn open_session_count(&self) -> usize {
        self.sessions.len()
    }

    fn page_for(&self, session: &SessionState) -> Option<&PageScript> {
        session
            .current_url
            .as_ref()
            .and_then(|url| self.pages.get(url))
    }

    fn with_session<T>(
        &self,
        handle: &SessionHandle,
        f: impl FnOnce(&mut SessionState) -> Result<T, AdapterError>,
    ) -> Result<T, AdapterError> {
        let entry = self
            .sessions
            .get(&handle.0)
            .ok_or(AdapterError::SessionClosed)?;
        let mut guard = entry.lock();
        f(&mut guard)
    }
}

#[async_trait]
impl BrowserAdapter for ScriptedAdapter {
    async fn new_isolated_session(&self) -> Result<SessionHandle, AdapterError> {
        let handle = SessionHandle::new();
        self.sessions
            .insert(handle.0, Mutex::new(SessionState::default()));
        debug!(session = %handle.0, "scripted session opened");
        Ok(handle)
    }

    async fn navigate(
        &self,
        session: &SessionHandle,
        url: &str,
        _timeout: Duration,
    ) -> Result<(), AdapterError> {
        let page = self
            .pages
            .get(url)
            .ok_or_else(|| AdapterError::Navigation {
                url: url.to_string(),
                reason: "unknown url".into(),
            })?;
        if page.fail_navigation {
            return Err(AdapterError::Navigation {
                url: url.to_string(),
                reason: "target unreachable".into(),
            });
        }
        self.with_session(session, |state| {
            state.current_url = Some(url.to_string());
            state.removed.clear();
            for cookie in &page.cookies_on_load {
                state.set_cookie(cookie.clone());
                state.emit(NetworkEvent::CookieSet(cookie.clone()));
            }
            for request in &page.requests_on_load {
                state.emit(NetworkEvent::Request(RequestEvent {
                    request_id: request.id.clone(),
                    url: request.url.clone(),
                    resource_type: request.resource_type,
                    initiator: request.initiator.clone(),
                    timestamp: Utc::now(),
                }));
            }
            Ok(())
        })
    }

    async fn wait_for_selector(
        &self,
        session: &SessionHandle,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AdapterError> {
        let present = self.with_session(session, |state| {
            let page = state
                .current_url
                .as_ref()
                .and_then(|url| self.pages.get(url));
            Ok(match page {
                Some(page) => {
                    page.element_ids.iter().any(|id| id == selector)
                        && state.element_present(selector)
                }
                None => false,
            })
        })?;
        if present {
            Ok(())
        } else {
            // Scripted pages are static; an absent selector never appears.
            Err(AdapterError::timeout(
                format!("waitForSelector({selector})"),
                timeout,
            ))
        }
    }

    async fn click(&self, session: &SessionHandle, selector: &str) -> Result<(), AdapterError> {
        // Clone the effect out so the session lock is not held across it.
        let effect = self.with_session(session, |state| {
            let page = self
                .page_for(state)
                .ok_or_else(|| AdapterError::Internal("no page loaded".into()))?;
            let exists =
                page.element_ids.iter().any(|id| id == selector) && state.element_present(selector);
            if !exists {
                return Err(AdapterError::SelectorNotFound(selector.to_string()));
            }
            Ok(page.click_effects.get(selector).cloned())
        })?;

        if let Some(effect) = effect {
            self.with_session(session, |state| {
                for cookie in &effect.cookies {
                    state.set_cookie(cookie.clone());
                    state.emit(NetworkEvent::CookieSet(cookie.clone()));
                }
                for request in &effect.requests {
                    state.emit(NetworkEvent::Request(RequestEvent {
                        request_id: request.id.clone(),
                        url: request.url.clone(),
                        resource_type: request.resource_type,
                        initiator: request.initiator.clone(),
                        timestamp: Utc::now(),
                    }));
                }
                for id in &effect.removes_elements {
                    state.removed.insert(id.clone());
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    async fn get_cookies(&self, session: &SessionHandle) -> Result<Vec<RawCookie>, AdapterError> {
        self.with_session(session, |state| Ok(state.jar.clone()))
    }

    async fn subscribe_network_events(
        &self,
        session: &SessionHandle,
    ) -> Result<mpsc::Receiver<NetworkEvent>, AdapterError> {
        self.with_session(session, |state| {
            let (tx, rx) = mpsc::channel(state.buffer.len() + 256);
            // Replay history so a subscriber opened after navigation still
            // sees the load burst, then keep the sender for live events.
            for event in &state.buffer {
                let _ = tx.try_send(event.clone());
            }
            state.subscribers.push(tx);
            Ok(rx)
        })
    }

    async fn execute_script(
        &self,
        session: &SessionHandle,
        script: &str,
    ) -> Result<serde_json::Value, AdapterError> {
        self.with_session(session, |state| {
            let page = self
                .page_for(state)
                .ok_or_else(|| AdapterError::Internal("no page loaded".into()))?;
            let value = match script {
                scripts::COLLECT_ELEMENT_IDS => {
                    let ids: Vec<&String> = page
                        .element_ids
                        .iter()
                        .filter(|id| !state.removed.contains(*id))
                        .collect();
                    serde_json::json!(ids)
                }
                scripts::COLLECT_PAGE_TEXT => serde_json::json!(page.page_text),
                scripts::SCROLL_PROBE => serde_json::json!(page.scroll_succeeds),
                scripts::NEUTRAL_CLICK_PROBE => serde_json::json!(page.neutral_click_succeeds),
                scripts::PAGE_READY => serde_json::json!(true),
                _ => serde_json::Value::Null,
            };
            Ok(value)
        })
    }

    async fn close(&self, session: SessionHandle) -> Result<(), AdapterError> {
        // Dropping the state drops its senders, which ends subscriber
        // streams. Closing twice is fine.
        if self.sessions.remove(&session.0).is_some() {
            debug!(session = %session.0, "scripted session closed");
        }
        Ok(())
    }
}
