//! Browser session capability
//!
//! The pipeline talks to the page only through `SearchSession`; how a
//! session is backed (a stealth Chromium page or a fetched HTML document)
//! is decided by the `SessionProvider` handed to the orchestrator.

mod chromium;
mod html;
mod network_idle;

pub use chromium::ChromiumSessionProvider;
pub use html::{HtmlSession, HtmlSessionProvider, StaticHtmlProvider};
pub use network_idle::InflightTracker;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::web_search::{RawMatch, SearchError};

/// Provisions one exclusively-owned session per pipeline run
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Start a new isolated session
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Launch` if the backing resource cannot start.
    async fn acquire(&self) -> Result<Box<dyn SearchSession>, SearchError>;
}

/// One page in one isolated browser context
///
/// Methods are not bounded in time; callers apply their own timeouts.
#[async_trait]
pub trait SearchSession: Send {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Load `url` and wait until the network has settled
    async fn goto(&mut self, url: &str) -> Result<(), SearchError>;

    /// Resolve once an element matching `selector` exists
    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), SearchError>;

    /// Evaluate one selector strategy inside the loaded document
    ///
    /// Each match carries the element's trimmed text and the resolved URL of
    /// its nearest enclosing link, in document order.
    async fn query_matches(&mut self, selector: &str) -> Result<Vec<RawMatch>, SearchError>;

    /// Tear down the page and its browser process
    async fn close(&mut self) -> Result<(), SearchError>;
}

/// Exactly-once release wrapper around an acquired session
///
/// `release()` is idempotent. A guard dropped without release (handler
/// future cancelled, panic) schedules the close on the current runtime.
pub struct SessionGuard {
    session: Option<Box<dyn SearchSession>>,
    id: String,
}

impl SessionGuard {
    #[must_use]
    pub fn new(session: Box<dyn SearchSession>) -> Self {
        let id = session.id().to_string();
        Self {
            session: Some(session),
            id,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.session.is_none()
    }

    /// Borrow the live session, or `None` once released
    pub fn session(&mut self) -> Option<&mut (dyn SearchSession + 'static)> {
        self.session.as_deref_mut()
    }

    /// Close the session if still open
    ///
    /// Returns `true` if this call performed the close. Close errors are
    /// logged, not returned: teardown must never mask the pipeline outcome.
    pub async fn release(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        debug!("Releasing session {}", self.id);
        if let Err(e) = session.close().await {
            warn!("Failed to close session {} cleanly: {}", self.id, e);
        }
        true
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        warn!("Session {} dropped without release - closing in background", self.id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let id = self.id.clone();
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("Background close of session {id} failed: {e}");
                    }
                });
            }
            Err(_) => warn!("No runtime available to close session {}", self.id),
        }
    }
}
