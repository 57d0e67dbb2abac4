//! Stealth Chromium sessions
//!
//! Every session owns a dedicated browser process with its own profile
//! directory, so concurrent searches never share cookies or storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::network_idle::goto_and_wait_for_idle;
use super::{SearchSession, SessionProvider};
use crate::browser_profile::create_unique_profile;
use crate::browser_setup::launch_browser;
use crate::config::SearchConfig;
use crate::stealth::{self, StealthProfile};
use crate::web_search::{RawMatch, SearchError};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser process plus the task driving its CDP connection
///
/// The handler MUST be aborted once the browser is gone, and the profile
/// directory can only be removed after the process has exited.
struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    async fn shutdown(&mut self) -> anyhow::Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser exit: {e}");
        }
        self.handler.abort();
        self.cleanup_temp_dir();
        closed.map(|_| ()).map_err(anyhow::Error::from)
    }

    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Removing browser profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to remove browser profile {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop kills the process
        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without shutdown - removing profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Launches one stealth browser per acquired session
pub struct ChromiumSessionProvider {
    config: Arc<SearchConfig>,
}

impl ChromiumSessionProvider {
    #[must_use]
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromiumSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn SearchSession>, SearchError> {
        let profile = create_unique_profile().map_err(|e| SearchError::Launch(format!("{e:#}")))?;

        let (browser, handler) = launch_browser(&self.config, profile.path())
            .await
            .map_err(|e| SearchError::Launch(format!("{e:#}")))?;
        let id = profile
            .path()
            .file_name()
            .map_or_else(|| "chromium".to_string(), |n| n.to_string_lossy().into_owned());
        let wrapper = BrowserWrapper::new(browser, handler, profile.into_path());

        let page = wrapper
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Launch(format!("Failed to open page: {e}")))?;

        // Evasions must be registered before the first real navigation
        match stealth::inject(&page, &StealthProfile::from_config(&self.config)).await {
            Ok(count) => debug!("Session {id}: {count} stealth scripts registered"),
            Err(e) => warn!("Session {id}: stealth injection failed: {e:#}"),
        }

        info!("Launched browser session {id}");
        Ok(Box::new(ChromiumSession {
            id,
            page,
            wrapper,
            settle: self.config.network_idle_settle(),
            max_inflight: self.config.network_idle_max_inflight(),
        }))
    }
}

/// One stealth page inside its own browser process
pub struct ChromiumSession {
    id: String,
    page: Page,
    wrapper: BrowserWrapper,
    settle: Duration,
    max_inflight: usize,
}

/// In-page evaluation for one selector strategy
fn match_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!(
        r"
        (() => {{
            return Array.from(document.querySelectorAll({selector})).map(element => {{
                const link = element.closest('a');
                return {{
                    title: (element.textContent || '').trim(),
                    url: link && link.href ? link.href : null
                }};
            }});
        }})()
        "
    )
}

#[async_trait]
impl SearchSession for ChromiumSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn goto(&mut self, url: &str) -> Result<(), SearchError> {
        goto_and_wait_for_idle(&self.page, url, self.settle, self.max_inflight)
            .await
            .map_err(|e| SearchError::Navigation(format!("{e:#}")))
    }

    async fn wait_for_selector(&mut self, selector: &str) -> Result<(), SearchError> {
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn query_matches(&mut self, selector: &str) -> Result<Vec<RawMatch>, SearchError> {
        self.page
            .evaluate(match_script(selector))
            .await
            .map_err(|e| SearchError::Evaluation(e.to_string()))?
            .into_value::<Vec<RawMatch>>()
            .map_err(|e| SearchError::Evaluation(format!("Unexpected evaluation result: {e}")))
    }

    async fn close(&mut self) -> Result<(), SearchError> {
        info!("Closing browser session {}", self.id);
        self.wrapper
            .shutdown()
            .await
            .map_err(|e| SearchError::Teardown(format!("{e:#}")))
    }
}
