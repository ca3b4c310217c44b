use std::sync::Arc;

use tracing::warn;

use browser_adapter::{BrowserAdapter, SessionHandle};

/// Scoped ownership of one browser session.
///
/// Every exit path must call [`SessionGuard::release`]; if the guard is
/// dropped instead (cancellation unwinding a sub-run future), the close is
/// handed to the runtime so no browser session is orphaned.
pub struct SessionGuard {
    adapter: Arc<dyn BrowserAdapter>,
    handle: Option<SessionHandle>,
}

impl SessionGuard {
    pub async fn acquire(
        adapter: Arc<dyn BrowserAdapter>,
    ) -> Result<Self, browser_adapter::AdapterError> {
        let handle = adapter.new_isolated_session().await?;
        Ok(Self {
            adapter,
            handle: Some(handle),
        })
    }

    pub fn handle(&self) -> &SessionHandle {
        self.handle
            .as_ref()
            .expect("session guard used after release")
    }

    pub async fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.adapter.close(handle).await {
                warn!(error = %err, "browser session close failed");
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let adapter = Arc::clone(&self.adapter);
            match tokio::runtime::Handle::try_current() {
                Ok(rt) => {
                    rt.spawn(async move {
                        let _ = adapter.close(handle).await;
                    });
                }
                Err(_) => warn!(session = %handle.0, "browser session leaked at drop"),
            }
        }
    }
}
